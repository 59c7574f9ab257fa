//! Built-in catalog, sellers, reels and demo accounts.
//!
//! Stores seed themselves from these when storage holds nothing usable, and
//! `kc-cli seed` writes them into `PostgreSQL`.

use chrono::{Duration, TimeZone, Utc};

use kala_connect_core::{
    CartItem, Order, OrderId, OrderStatus, Price, Product, ProductId, ProductSale, Reel, ReelId,
    Review, ReviewId, Seller, SellerId, ShippingAddress,
};

/// Seller profile managed from the dashboard.
///
/// Seller accounts are not linked to a seller profile; every signed-in seller
/// manages this one.
pub const DASHBOARD_SELLER_ID: &str = "seller-1";

/// Demo buyer account.
pub const DEMO_BUYER_EMAIL: &str = "user@example.com";
/// Demo buyer password.
pub const DEMO_BUYER_PASSWORD: &str = "password";
/// Demo seller account.
pub const DEMO_SELLER_EMAIL: &str = "seller@gmail.com";
/// Demo seller password.
pub const DEMO_SELLER_PASSWORD: &str = "ruchika";
/// Reward-point balance of the demo buyer.
pub const DEMO_BUYER_COINS: u32 = 120;

struct Listing {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    price: i64,
    original_price: Option<i64>,
    seller_id: &'static str,
    tags: &'static [&'static str],
    cultural_context: &'static str,
    hint: &'static str,
    color: &'static str,
    coins: u32,
    stock: u32,
    sales: &'static [(&'static str, u32)],
}

const LISTINGS: &[Listing] = &[
    Listing {
        id: "prod-1",
        name: "Blue Pottery Vase",
        description: "A glazed Jaipur blue pottery vase painted by hand with floral motifs in cobalt and turquoise.",
        price: 999,
        original_price: Some(1299),
        seller_id: "seller-1",
        tags: &["home-decor", "pottery", "Jaipur"],
        cultural_context: "Jaipur blue pottery uses quartz rather than clay, a technique that arrived in Rajasthan with Persian artisans.",
        hint: "blue vase",
        color: "Blue",
        coins: 20,
        stock: 15,
        sales: &[("2025-05", 12), ("2025-06", 18), ("2025-07", 25)],
    },
    Listing {
        id: "prod-2",
        name: "Madhubani Painting",
        description: "A hand-painted Madhubani artwork on handmade paper depicting a fish pair, a symbol of fertility.",
        price: 2499,
        original_price: None,
        seller_id: "seller-2",
        tags: &["art", "painting", "Bihar"],
        cultural_context: "Madhubani painting comes from the Mithila region of Bihar, where women traditionally painted the walls of their homes for weddings.",
        hint: "madhubani painting",
        color: "Red",
        coins: 40,
        stock: 6,
        sales: &[("2025-05", 3), ("2025-06", 4), ("2025-07", 2)],
    },
    Listing {
        id: "prod-3",
        name: "Pashmina Shawl",
        description: "A soft hand-woven pashmina shawl with delicate sozni embroidery along the border.",
        price: 4999,
        original_price: Some(5999),
        seller_id: "seller-3",
        tags: &["fashion", "textiles", "Kashmir"],
        cultural_context: "Pashmina wool is combed from Changthangi goats in Ladakh and spun and woven by hand in Kashmir.",
        hint: "pashmina shawl",
        color: "Beige",
        coins: 60,
        stock: 4,
        sales: &[("2025-05", 5), ("2025-06", 6), ("2025-07", 9)],
    },
    Listing {
        id: "prod-4",
        name: "Terracotta Diya Set",
        description: "A set of twelve hand-moulded terracotta diyas, painted in festive colours.",
        price: 999,
        original_price: None,
        seller_id: "seller-1",
        tags: &["home-decor", "spiritual", "festive"],
        cultural_context: "Clay lamps are lit in every home during Diwali to welcome prosperity and mark the victory of light over darkness.",
        hint: "terracotta diya",
        color: "Orange",
        coins: 25,
        stock: 40,
        sales: &[("2025-05", 2), ("2025-06", 3), ("2025-07", 1)],
    },
    Listing {
        id: "prod-5",
        name: "Channapatna Wooden Toys",
        description: "A set of lacquered wooden spinning tops and stacking rings, coloured with vegetable dyes.",
        price: 749,
        original_price: None,
        seller_id: "seller-2",
        tags: &["toys", "wood", "Karnataka"],
        cultural_context: "Channapatna, the toy town of Karnataka, has turned ivory-wood toys on lathes since the time of Tipu Sultan.",
        hint: "wooden toys",
        color: "Multicolor",
        coins: 15,
        stock: 25,
        sales: &[("2025-05", 8), ("2025-06", 7), ("2025-07", 10)],
    },
    Listing {
        id: "prod-6",
        name: "Block Print Kurta",
        description: "A cotton kurta hand block printed with natural indigo in the Bagru style.",
        price: 1999,
        original_price: Some(2499),
        seller_id: "seller-1",
        tags: &["fashion", "textiles", "Rajasthan"],
        cultural_context: "Bagru printers in Rajasthan carve teak blocks by hand and print with dyes made from indigo, pomegranate and iron.",
        hint: "block kurta",
        color: "Indigo",
        coins: 25,
        stock: 8,
        sales: &[("2025-05", 10), ("2025-06", 14), ("2025-07", 16)],
    },
    Listing {
        id: "prod-7",
        name: "Dhokra Brass Figurine",
        description: "A lost-wax cast brass figurine of a tribal drummer from Chhattisgarh.",
        price: 1599,
        original_price: None,
        seller_id: "seller-3",
        tags: &["art", "metal", "tribal"],
        cultural_context: "Dhokra is one of the oldest known metal casting traditions, practised by tribal smiths for over four thousand years.",
        hint: "brass figurine",
        color: "Gold",
        coins: 30,
        stock: 3,
        sales: &[("2025-05", 1), ("2025-06", 2), ("2025-07", 1)],
    },
    Listing {
        id: "prod-8",
        name: "Kalamkari Table Runner",
        description: "A cotton table runner with hand-drawn Kalamkari peacock motifs in natural dyes.",
        price: 1299,
        original_price: None,
        seller_id: "seller-1",
        tags: &["home-decor", "textiles", "Andhra Pradesh"],
        cultural_context: "Kalamkari, literally pen-work, is drawn freehand with a bamboo pen in Srikalahasti and Machilipatnam.",
        hint: "kalamkari runner",
        color: "Maroon",
        coins: 20,
        stock: 30,
        sales: &[("2025-05", 1), ("2025-06", 0), ("2025-07", 1)],
    },
];

const REVIEWS: &[(&str, &str, &str, u8, &str)] = &[
    ("rev-1", "prod-1", "Ananya", 5, "Beautiful colours and it arrived very well packed."),
    ("rev-2", "prod-1", "Rohit", 4, "Lovely vase, a little smaller than I expected."),
    ("rev-3", "prod-4", "Meera", 5, "Perfect for Diwali, the painting is so cheerful."),
    ("rev-4", "prod-4", "Karan", 2, "Two diyas were chipped and delivery was late."),
    ("rev-5", "prod-6", "Sana", 5, "Great quality cotton and the indigo did not bleed."),
    ("rev-6", "prod-6", "Vikram", 3, "Nice print but the colour was darker than the photo."),
];

fn image_url(hint: &str) -> String {
    format!("https://placehold.co/600x600.png?text={}", hint.replace(' ', "+"))
}

/// The built-in catalog.
#[must_use]
pub fn products() -> Vec<Product> {
    let review_date = Utc.with_ymd_and_hms(2025, 7, 1, 10, 0, 0).single().unwrap_or_else(Utc::now);

    LISTINGS
        .iter()
        .map(|l| Product {
            id: ProductId::new(l.id),
            name: l.name.to_owned(),
            description: l.description.to_owned(),
            price: Price::from_whole(l.price),
            original_price: l.original_price.map(Price::from_whole),
            image: image_url(l.hint),
            seller_id: SellerId::new(l.seller_id),
            tags: l.tags.iter().map(|t| (*t).to_owned()).collect(),
            cultural_context: Some(l.cultural_context.to_owned()),
            ai_generated: false,
            data_ai_hint: Some(l.hint.to_owned()),
            color: Some(l.color.to_owned()),
            sustainability_coins: l.coins,
            reviews: REVIEWS
                .iter()
                .filter(|(_, product, ..)| *product == l.id)
                .map(|(id, _, author, rating, comment)| Review {
                    id: ReviewId::new(*id),
                    author: (*author).to_owned(),
                    rating: *rating,
                    comment: (*comment).to_owned(),
                    date: review_date,
                })
                .collect(),
            stock: l.stock,
            sales: l
                .sales
                .iter()
                .map(|(month, units_sold)| ProductSale {
                    month: (*month).to_owned(),
                    units_sold: *units_sold,
                })
                .collect(),
        })
        .collect()
}

/// Artisan storefront profiles.
#[must_use]
pub fn sellers() -> Vec<Seller> {
    [
        (
            "seller-1",
            "Rang Mahal Crafts",
            "A family workshop in Jaipur making blue pottery, block prints and festive decor for three generations.",
            "Ruchika Sharma",
            "Ruchika learned glazing from her grandfather and now trains twenty women from her neighbourhood.",
            "pottery logo",
            "jaipur workshop",
        ),
        (
            "seller-2",
            "Mithila Rang",
            "A collective of Madhubani painters and Channapatna toy makers selling directly to buyers.",
            "Sunita Devi",
            "Sunita paints with brushes made from bamboo twigs and colours ground from flowers and soot.",
            "painting logo",
            "mithila village",
        ),
        (
            "seller-3",
            "Himalayan Looms",
            "Weavers and metal casters from Kashmir and Bastar keeping slow craft alive.",
            "Farida Begum",
            "Farida runs a cooperative of forty weavers who each spend months on a single shawl.",
            "loom logo",
            "kashmir valley",
        ),
    ]
    .into_iter()
    .map(|(id, name, story, craftswoman, background, logo_hint, cover_hint)| Seller {
        id: SellerId::new(id),
        name: name.to_owned(),
        story: story.to_owned(),
        logo: image_url(logo_hint),
        craftswoman_name: craftswoman.to_owned(),
        background: background.to_owned(),
        cover_image: image_url(cover_hint),
        logo_data_ai_hint: logo_hint.to_owned(),
        cover_data_ai_hint: cover_hint.to_owned(),
    })
    .collect()
}

/// Built-in reels.
#[must_use]
pub fn reels() -> Vec<Reel> {
    [
        ("reel-1", "seller-1", "Watch our blue pottery come to life, one brushstroke at a time. #BluePottery #Jaipur", &["prod-1"][..]),
        ("reel-2", "seller-2", "From bamboo brush to Madhubani masterpiece. #Madhubani #IndianArt", &["prod-2", "prod-5"][..]),
        ("reel-3", "seller-1", "Light up your Diwali with handmade diyas. #Diwali #Handmade", &["prod-4", "prod-8"][..]),
    ]
    .into_iter()
    .map(|(id, seller, caption, tagged)| Reel {
        id: ReelId::new(id),
        video_url: format!("https://storage.googleapis.com/kala-connect/reels/{id}.mp4"),
        caption: caption.to_owned(),
        seller_id: SellerId::new(seller),
        tagged_product_ids: tagged.iter().map(|p| ProductId::new(*p)).collect(),
        script: None,
        ai_generated: None,
    })
    .collect()
}

fn demo_address() -> ShippingAddress {
    ShippingAddress {
        name: "Demo User".to_owned(),
        address: "123 Test St".to_owned(),
        city: "Testville".to_owned(),
        state: "Testland".to_owned(),
        pincode: "123456".to_owned(),
    }
}

/// Orders on the demo buyer account, newest first.
#[must_use]
pub fn demo_orders() -> Vec<Order> {
    let catalog = products();
    let line = |id: &str| {
        catalog
            .iter()
            .find(|p| p.id.as_str() == id)
            .cloned()
            .map(|product| CartItem { product, quantity: 1 })
    };

    let now = Utc::now();
    let mut orders = Vec::new();

    let first: Vec<CartItem> = line("prod-1").into_iter().collect();
    orders.push(Order {
        id: OrderId::new("order-demo-1"),
        date: now - Duration::days(3),
        total: kala_connect_core::cart::subtotal(&first),
        points_earned: kala_connect_core::cart::reward_points(&first),
        items: first,
        status: OrderStatus::Processing,
        shipping_address: demo_address(),
    });

    let second: Vec<CartItem> = line("prod-6").into_iter().chain(line("prod-4")).collect();
    orders.push(Order {
        id: OrderId::new("order-demo-2"),
        date: now - Duration::days(10),
        total: kala_connect_core::cart::subtotal(&second),
        points_earned: kala_connect_core::cart::reward_points(&second),
        items: second,
        status: OrderStatus::Delivered,
        shipping_address: demo_address(),
    });

    orders
}
