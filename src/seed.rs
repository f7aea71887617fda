//! Synthetic users and products for seeding empty tables and backfilling new users.

use crate::models::{Product, User};
use fake::faker::internet::en::{IPv4, Password, SafeEmail, Username};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use rand::seq::IndexedRandom;
use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Users inserted into an empty `users` table at startup.
pub const SEED_USER_COUNT: usize = 20;

/// Products inserted into an empty `products` table at startup.
pub const SEED_PRODUCT_COUNT: usize = 40;

const ADJECTIVES: &[&str] = &[
    "Small", "Ergonomic", "Rustic", "Intelligent", "Gorgeous", "Incredible", "Fantastic",
    "Practical", "Sleek", "Awesome", "Generic", "Handcrafted", "Handmade", "Licensed", "Refined",
    "Unbranded", "Tasty",
];

const MATERIALS: &[&str] = &[
    "Steel", "Wooden", "Concrete", "Plastic", "Cotton", "Granite", "Rubber", "Metal", "Soft",
    "Fresh", "Frozen",
];

const NOUNS: &[&str] = &[
    "Chair", "Car", "Computer", "Keyboard", "Mouse", "Bike", "Ball", "Gloves", "Pants", "Shirt",
    "Table", "Shoes", "Hat", "Towels", "Soap", "Tuna", "Chicken", "Fish", "Cheese", "Bacon",
    "Pizza", "Salad", "Sausages", "Chips",
];

/// Source of plausible entities. Implementations must not touch persistence.
pub trait SeedProvider: Send + Sync {
    fn generate_user(&self) -> User;
    fn generate_product(&self) -> Product;
}

/// [`SeedProvider`] backed by the `fake` crate and the thread-local RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct FakeSeedProvider;

impl SeedProvider for FakeSeedProvider {
    fn generate_user(&self) -> User {
        generate_user_with(&mut rand::rng())
    }

    fn generate_product(&self) -> Product {
        generate_product_with(&mut rand::rng())
    }
}

pub fn generate_user_with<R: Rng + ?Sized>(rng: &mut R) -> User {
    let id = Uuid::from_u128(rng.random());
    User {
        id,
        login: Username().fake_with_rng(rng),
        password_hash: Password(8..16).fake_with_rng(rng),
        avatar_url: format!("https://i.pravatar.cc/150?u={}", id.simple()),
        email: SafeEmail().fake_with_rng(rng),
        last_known_ip: IPv4().fake_with_rng(rng),
    }
}

pub fn generate_product_with<R: Rng + ?Sized>(rng: &mut R) -> Product {
    let adjective = pick(rng, ADJECTIVES);
    let material = pick(rng, MATERIALS);
    let noun = pick(rng, NOUNS);
    Product {
        id: Uuid::from_u128(rng.random()),
        name: format!("{adjective} {material} {noun}"),
        description: Sentence(6..14).fake_with_rng(rng),
        adjective: adjective.to_string(),
        material: material.to_string(),
        // 1.00 ..= 1000.00
        price: Decimal::new(rng.random_range(100..=100_000), 2),
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, words: &[&'static str]) -> &'static str {
    words.choose(rng).copied().unwrap_or_default()
}
