#![allow(dead_code)]

/// Shared fixtures for lifecycle integration tests
use chrono::NaiveDate;
use lostfound_shared::{
    lifecycle::{claims, items},
    models::{
        claim::ClaimRequest,
        item::{Item, ItemCategory, ItemFields, ItemType},
        user::{CreateUser, User},
    },
    store::{memory::MemoryStore, Store},
};

/// Creates a user directly in the store (skips password hashing)
pub async fn user(store: &MemoryStore, username: &str) -> User {
    store
        .create_user(CreateUser {
            username: username.to_string(),
            email: Some(format!("{}@example.com", username)),
            password_hash: "$argon2id$test".to_string(),
        })
        .await
        .expect("Failed to create test user")
}

pub fn fields(title: &str, item_type: ItemType, category: ItemCategory) -> ItemFields {
    ItemFields {
        title: title.to_string(),
        description: format!("{} described in detail", title),
        category,
        item_type,
        location: "Library 2nd Floor".to_string(),
        date_reported: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        image: None,
    }
}

pub async fn item(store: &MemoryStore, owner: &User, title: &str) -> Item {
    items::create(store, owner.id, fields(title, ItemType::Found, ItemCategory::Others))
        .await
        .expect("Failed to create test item")
}

pub async fn claim(store: &MemoryStore, item: &Item, claimant: &User) -> ClaimRequest {
    claims::submit(store, item.id, claimant.id, "It has my initials on the back")
        .await
        .expect("Failed to submit test claim")
}
