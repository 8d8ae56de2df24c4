//! Database seeder for Cambio development and testing.
//!
//! Seeds a test organization, a teller, its repositories (till, vault,
//! BTC wallet), and the denomination ladders for local development.
//!
//! Usage: cargo run --bin seeder

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use cambio_db::entities::{denominations, organizations, repositories, users};
use cambio_shared::AppConfig;

/// Test organization ID (consistent for all seeds)
const TEST_ORG_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Test user ID (consistent for all seeds)
const TEST_USER_ID: &str = "00000000-0000-0000-0000-000000000002";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| AppConfig::load().ok().map(|c| c.database.url))
        .expect("Set DATABASE_URL or configure [database].url");

    println!("Connecting to database...");
    let db = cambio_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding test organization...");
    seed_test_organization(&db).await;

    println!("Seeding test user...");
    seed_test_user(&db).await;

    println!("Seeding repositories...");
    seed_repositories(&db).await;

    println!("Seeding denominations...");
    seed_denominations(&db).await;

    println!("Seeding complete!");
}

fn test_org_id() -> Uuid {
    Uuid::parse_str(TEST_ORG_ID).unwrap()
}

fn test_user_id() -> Uuid {
    Uuid::parse_str(TEST_USER_ID).unwrap()
}

/// Seeds a test organization for development.
async fn seed_test_organization(db: &DatabaseConnection) {
    if organizations::Entity::find_by_id(test_org_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test organization already exists, skipping...");
        return;
    }

    let now = chrono::Utc::now().into();
    let org = organizations::ActiveModel {
        id: Set(test_org_id()),
        name: Set("Cambio Dev Bureau".to_string()),
        slug: Set("cambio-dev".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    org.insert(db).await.expect("Failed to seed organization");
}

/// Seeds a test user for development.
async fn seed_test_user(db: &DatabaseConnection) {
    if users::Entity::find_by_id(test_user_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test user already exists, skipping...");
        return;
    }

    let now = chrono::Utc::now().into();
    let user = users::ActiveModel {
        id: Set(test_user_id()),
        email: Set("teller@cambio.dev".to_string()),
        full_name: Set("Test Teller".to_string()),
        organization_id: Set(test_org_id()),
        active_session_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    user.insert(db).await.expect("Failed to seed user");
}

/// Seeds a till, a vault, and a crypto wallet.
async fn seed_repositories(db: &DatabaseConnection) {
    let now = chrono::Utc::now().into();

    for (name, kind) in [
        ("Front Till", "till"),
        ("Main Vault", "vault"),
        ("BTC Wallet", "wallet"),
    ] {
        let repo = repositories::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(test_org_id()),
            name: Set(name.to_string()),
            kind: Set(kind.to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        match repo.insert(db).await {
            Ok(_) => println!("  Seeded {name}"),
            Err(_) => println!("  {name} already exists, skipping..."),
        }
    }
}

/// Seeds USD and EUR cash ladders plus BTC denominations.
async fn seed_denominations(db: &DatabaseConnection) {
    let now = chrono::Utc::now().into();

    let usd = [
        Decimal::new(10000, 2),
        Decimal::new(5000, 2),
        Decimal::new(2000, 2),
        Decimal::new(1000, 2),
        Decimal::new(500, 2),
        Decimal::new(100, 2),
    ];
    let eur = [
        Decimal::new(50000, 2),
        Decimal::new(20000, 2),
        Decimal::new(10000, 2),
        Decimal::new(5000, 2),
        Decimal::new(2000, 2),
        Decimal::new(1000, 2),
        Decimal::new(500, 2),
    ];
    // Satoshi-scale units for the wallet.
    let btc = [Decimal::new(1, 3), Decimal::new(1, 4)];

    for (ticker, values) in [("USD", &usd[..]), ("EUR", &eur[..]), ("BTC", &btc[..])] {
        for value in values {
            let denom = denominations::ActiveModel {
                id: Set(Uuid::new_v4()),
                ticker: Set(ticker.to_string()),
                value: Set(*value),
                accepted: Set(true),
                created_at: Set(now),
            };
            if denom.insert(db).await.is_err() {
                println!("  {ticker} {value} already exists, skipping...");
            }
        }
    }
}
