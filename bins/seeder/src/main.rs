//! Database seeder for Fisca development and testing.
//!
//! Seeds users across the approval ladder, org units, activities, and a
//! handful of budget rows — the stand-in for the out-of-scope budget
//! import pipeline.
//!
//! Usage: cargo run --bin seeder

use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use argon2::Argon2;
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use fisca_db::entities::{activities, budget_rows, org_units, users};

/// Every seeded account uses this development password.
const DEV_PASSWORD: &str = "fisca-dev";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = fisca_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding users...");
    seed_users(&db).await;

    println!("Seeding org units...");
    let org_unit_id = seed_org_units(&db).await;

    println!("Seeding activities and budget rows...");
    seed_budget(&db, org_unit_id).await;

    println!("Seeding complete!");
}

fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("hashing failed")
        .to_string()
}

async fn seed_users(db: &DatabaseConnection) {
    let accounts: [(&str, &str, i16); 6] = [
        ("requester", "Budget Requester", 0),
        ("approver-l1", "Level 1 Approver", 1),
        ("approver-l2", "Level 2 Approver", 2),
        ("approver-l3", "Level 3 Approver", 3),
        ("approver-l4", "Level 4 Approver", 4),
        ("admin", "Superuser", 9),
    ];

    for (username, display_name, admin_level) in accounts {
        let exists = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some();
        if exists {
            println!("  User {username} already exists, skipping...");
            continue;
        }

        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            password_hash: Set(hash_password(DEV_PASSWORD)),
            display_name: Set(display_name.to_string()),
            admin_level: Set(admin_level),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };

        match user.insert(db).await {
            Ok(_) => println!("  Created user: {username} (password: {DEV_PASSWORD})"),
            Err(e) => eprintln!("  Failed to insert user {username}: {e}"),
        }
    }
}

async fn seed_org_units(db: &DatabaseConnection) -> Uuid {
    if let Ok(Some(existing)) = org_units::Entity::find()
        .filter(org_units::Column::Code.eq("Z03"))
        .one(db)
        .await
    {
        println!("  Org units already exist, skipping...");
        return existing.id;
    }

    let zone = org_units::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set("Z03".to_string()),
        name: Set("Zone 3".to_string()),
        parent_id: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("insert zone");

    let department = org_units::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set("Z03-D12".to_string()),
        name: Set("Technical Services Department".to_string()),
        parent_id: Set(Some(zone.id)),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("insert department");

    println!("  Created org units Z03 / Z03-D12");
    department.id
}

async fn seed_budget(db: &DatabaseConnection, org_unit_id: Uuid) {
    let rows = [
        ("ACT-ROADS", "Road maintenance", "10203040", dec!(1_500_000)),
        ("ACT-LIGHT", "Street lighting", "10203041", dec!(400_000)),
        ("ACT-PARKS", "Parks and green space", "10203042", dec!(250_000)),
    ];

    for (activity_code, activity_name, coding, approved) in rows {
        let exists = budget_rows::Entity::find()
            .filter(budget_rows::Column::BudgetCoding.eq(coding))
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some();
        if exists {
            println!("  Budget row {coding} already exists, skipping...");
            continue;
        }

        let activity = activities::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(activity_code.to_string()),
            name: Set(activity_name.to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(db)
        .await
        .expect("insert activity");

        let now = Utc::now();
        let row = budget_rows::ActiveModel {
            id: Set(Uuid::new_v4()),
            activity_id: Set(activity.id),
            org_unit_id: Set(Some(org_unit_id)),
            budget_coding: Set(coding.to_string()),
            approved_amount: Set(approved),
            blocked_amount: Set(rust_decimal::Decimal::ZERO),
            spent_amount: Set(rust_decimal::Decimal::ZERO),
            fiscal_year: Set(2026),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        match row.insert(db).await {
            Ok(_) => println!("  Created budget row {coding} ({activity_name}, {approved})"),
            Err(e) => eprintln!("  Failed to insert budget row {coding}: {e}"),
        }
    }
}
