//! Seed the catalog (and optionally client accounts) from a YAML file.
//!
//! # Usage
//!
//! ```bash
//! wg-cli seed data/catalog.yaml
//! ```
//!
//! # File Format
//!
//! ```yaml
//! categories:
//!   - name: Hardware
//!     warehouse: Windsor
//!     products:
//!       - name: Claw hammer
//!         description: 16oz steel hammer
//!         price: "24.99"
//!         stock: 120
//! users:
//!   - username: jdoe
//!     email: jdoe@example.com
//!     first_name: Jane
//!     last_name: Doe
//!     password: change-me-please
//!     company: Doe Renovations
//!     city: Windsor
//!     province: ON
//!     interests: [Hardware]
//! ```
//!
//! Categories and products are matched by name and updated in place, so the
//! command can be re-run. Existing users are left as they are apart from
//! their shipping details and interests.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info, warn};

use windsor_goods_core::forms::RegisterForm;
use windsor_goods_core::{Price, Province, Stock};
use windsor_goods_storefront::db::{
    CategoryRepository, ClientDetails, ClientRepository, ProductRepository, ProductUpsert,
    UserRepository,
};
use windsor_goods_storefront::services::{AuthError, AuthService};

/// Warehouse used when a category doesn't name one.
const DEFAULT_WAREHOUSE: &str = "Windsor";

/// Longest category or product name the schema stores.
const CATALOG_NAME_MAX_LENGTH: usize = 200;

/// City used when a user doesn't name one.
const DEFAULT_CITY: &str = "Windsor";

/// Top level of a seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
    #[serde(default)]
    pub users: Vec<UserSeed>,
}

/// A category and its products.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorySeed {
    pub name: String,
    #[serde(default = "default_warehouse")]
    pub warehouse: String,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

/// A product within a category.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductSeed {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Quoted decimal, e.g. `"24.99"`.
    pub price: String,
    #[serde(default = "default_stock")]
    pub stock: i64,
    #[serde(default = "default_available")]
    pub available: bool,
}

/// A client account.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserSeed {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    #[serde(default)]
    pub company: String,
    pub shipping_address: Option<String>,
    pub city: Option<String>,
    pub province: Option<Province>,
    /// Category names.
    #[serde(default)]
    pub interests: Vec<String>,
}

fn default_warehouse() -> String {
    DEFAULT_WAREHOUSE.to_owned()
}

fn default_stock() -> i64 {
    i64::from(Stock::DEFAULT.units())
}

const fn default_available() -> bool {
    true
}

impl UserSeed {
    fn register_form(&self) -> RegisterForm {
        RegisterForm {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            password1: self.password.clone(),
            password2: self.password.clone(),
        }
    }
}

/// Check a seed file without touching the database.
///
/// Returns one message per problem found; an empty list means the file can
/// be applied. Interests naming categories outside the file are checked
/// against the database when applied.
#[must_use]
pub fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();

    let mut category_names = HashSet::new();
    for category in &seed.categories {
        if category.name.trim().is_empty() {
            errors.push("category with an empty name".to_owned());
        }
        if category.name.chars().count() > CATALOG_NAME_MAX_LENGTH {
            errors.push(format!("category {:?} has a name over 200 characters", category.name));
        }
        if !category_names.insert(category.name.as_str()) {
            errors.push(format!("category {:?} is listed twice", category.name));
        }

        let mut product_names = HashSet::new();
        for product in &category.products {
            let at = format!("{}/{}", category.name, product.name);
            if product.name.trim().is_empty() {
                errors.push(format!("{}: product with an empty name", category.name));
            }
            if product.name.chars().count() > CATALOG_NAME_MAX_LENGTH {
                errors.push(format!("{at}: name is over 200 characters"));
            }
            if !product_names.insert(product.name.as_str()) {
                errors.push(format!("{at}: product is listed twice"));
            }
            if let Err(e) = Price::parse(&product.price) {
                errors.push(format!("{at}: {e}"));
            }
            if let Err(e) = Stock::new(product.stock) {
                errors.push(format!("{at}: {e}"));
            }
        }
    }

    let mut usernames = HashSet::new();
    for user in &seed.users {
        if !usernames.insert(user.username.as_str()) {
            errors.push(format!("user {:?} is listed twice", user.username));
        }
        if let Err(field_errors) = user.register_form().validate() {
            errors.push(format!("user {:?}: {field_errors}", user.username));
        }
    }

    errors
}

/// Counts reported after seeding.
#[derive(Debug, Default)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
    pub users_created: usize,
    pub users_existing: usize,
}

/// Seed the database from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or a database operation fails.
pub async fn run(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed data from file");

    // Read and validate before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    info!(
        categories = seed.categories.len(),
        users = seed.users.len(),
        "Parsed seed file"
    );

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = super::connect().await?;
    info!("Connected to database");

    let summary = apply(&pool, &seed).await?;

    info!("Seeding complete!");
    info!("  Categories: {}", summary.categories);
    info!("  Products: {}", summary.products);
    info!("  Users created: {}", summary.users_created);
    info!("  Users already present: {}", summary.users_existing);

    Ok(())
}

async fn apply(
    pool: &sqlx::PgPool,
    seed: &SeedFile,
) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let categories = CategoryRepository::new(pool);
    let products = ProductRepository::new(pool);
    let mut summary = SeedSummary::default();

    for category_seed in &seed.categories {
        let category = categories
            .upsert(&category_seed.name, &category_seed.warehouse)
            .await?;
        summary.categories += 1;

        for product in &category_seed.products {
            products
                .upsert(ProductUpsert {
                    category_id: category.id,
                    name: &product.name,
                    description: &product.description,
                    price: Price::parse(&product.price)?,
                    stock: Stock::new(product.stock)?,
                    available: product.available,
                })
                .await?;
            summary.products += 1;
        }
    }

    let auth = AuthService::new(pool);
    let users = UserRepository::new(pool);
    let clients = ClientRepository::new(pool);

    for user_seed in &seed.users {
        let registration = user_seed
            .register_form()
            .validate()
            .map_err(|e| format!("user {:?}: {e}", user_seed.username))?;

        let user = match auth.register(&registration).await {
            Ok(user) => {
                summary.users_created += 1;
                user
            }
            Err(AuthError::UserAlreadyExists) => {
                summary.users_existing += 1;
                users
                    .get_by_username(&user_seed.username)
                    .await?
                    .ok_or_else(|| format!("user {:?} vanished", user_seed.username))?
            }
            Err(e) => return Err(e.into()),
        };

        let client = clients
            .get_by_user(user.id)
            .await?
            .ok_or_else(|| format!("user {:?} has no client record", user_seed.username))?;

        clients
            .update_details(
                client.id,
                ClientDetails {
                    company: &user_seed.company,
                    shipping_address: user_seed.shipping_address.as_deref(),
                    city: user_seed.city.as_deref().unwrap_or(DEFAULT_CITY),
                    province: user_seed.province.unwrap_or(Province::Ontario),
                },
            )
            .await?;

        for interest in &user_seed.interests {
            match categories.get_by_name(interest).await? {
                Some(category) => clients.add_interest(client.id, category.id).await?,
                None => warn!(
                    username = %user_seed.username,
                    category = %interest,
                    "Skipping interest in unknown category"
                ),
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
categories:
  - name: Hardware
    products:
      - name: Claw hammer
        description: 16oz steel hammer
        price: "24.99"
        stock: 120
      - name: Tape measure
        price: "9.50"
  - name: Garden
    warehouse: Tecumseh
users:
  - username: jdoe
    email: jdoe@example.com
    first_name: Jane
    last_name: Doe
    password: change-me-please
    province: QC
    interests: [Hardware, Garden]
"#;

    #[test]
    fn test_parse_sample_with_defaults() {
        let seed: SeedFile = serde_yaml::from_str(SAMPLE).unwrap();

        assert_eq!(seed.categories.len(), 2);
        let hardware = &seed.categories[0];
        assert_eq!(hardware.warehouse, DEFAULT_WAREHOUSE);
        assert_eq!(hardware.products[0].stock, 120);

        let tape = &hardware.products[1];
        assert_eq!(tape.stock, 100);
        assert!(tape.available);
        assert!(tape.description.is_empty());

        assert_eq!(seed.categories[1].warehouse, "Tecumseh");
        assert_eq!(seed.users[0].province, Some(Province::Quebec));
        assert!(validate(&seed).is_empty());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<SeedFile, _> =
            serde_yaml::from_str("categories:\n  - name: A\n    colour: red\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let seed: SeedFile = serde_yaml::from_str(
            r#"
categories:
  - name: Hardware
    products:
      - name: Saw
        price: "abc"
      - name: Saw
        price: "5.00"
        stock: 5000
  - name: Hardware
users:
  - username: jdoe
    email: not-an-email
    first_name: Jane
    last_name: Doe
    password: short
"#,
        )
        .unwrap();

        let errors = validate(&seed);
        assert!(errors.iter().any(|e| e.starts_with("Hardware/Saw: ") && e.contains("listed twice")));
        assert!(errors.iter().any(|e| e.contains("category \"Hardware\" is listed twice")));
        assert!(errors.iter().any(|e| e.starts_with("user \"jdoe\": ")));
        // bad price, duplicate product, over-capacity stock, duplicate category, user
        assert_eq!(errors.len(), 5);
    }
}
