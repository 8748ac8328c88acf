//! Catalog route handlers: categories, product listing and product detail
//! with the interest form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use windsor_goods_core::forms::{FieldErrors, InterestForm};
use windsor_goods_core::interest::PRODUCT_NOT_FOUND_MESSAGE;
use windsor_goods_core::{CategoryId, InterestChoice, ProductId};

use crate::db::{CategoryRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{Category, CurrentUser, Product};
use crate::state::AppState;

/// Number of products on the listing page.
const PRODUCT_LIST_LIMIT: i64 = 10;

/// Category detail template.
#[derive(Template, WebTemplate)]
#[template(path = "category.html")]
pub struct CategoryTemplate {
    pub current_user: Option<CurrentUser>,
    pub category: Category,
    pub products: Vec<Product>,
}

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products.html")]
pub struct ProductsTemplate {
    pub current_user: Option<CurrentUser>,
    pub products: Vec<Product>,
}

/// Product detail template.
///
/// `product` is `None` when the id does not exist; `message` then explains.
#[derive(Template, WebTemplate)]
#[template(path = "product_detail.html")]
pub struct ProductDetailTemplate {
    pub current_user: Option<CurrentUser>,
    pub product: Option<Product>,
    pub form: InterestForm,
    pub errors: FieldErrors,
    pub message: Option<&'static str>,
}

impl ProductDetailTemplate {
    fn missing(current_user: CurrentUser) -> Self {
        Self {
            current_user: Some(current_user),
            product: None,
            form: InterestForm::default(),
            errors: FieldErrors::new(),
            message: Some(PRODUCT_NOT_FOUND_MESSAGE),
        }
    }
}

/// Display a category and its products.
#[instrument(skip(state, current_user))]
pub async fn category(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Path(id): Path<CategoryId>,
) -> Result<Response> {
    let category = CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;

    let products = ProductRepository::new(state.pool())
        .list_by_category(category.id)
        .await?;

    Ok(CategoryTemplate {
        current_user,
        category,
        products,
    }
    .into_response())
}

/// Display the first products in the catalog.
#[instrument(skip(state, current_user))]
pub async fn products(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
) -> Result<Response> {
    let products = ProductRepository::new(state.pool())
        .list(PRODUCT_LIST_LIMIT)
        .await?;

    Ok(ProductsTemplate {
        current_user,
        products,
    }
    .into_response())
}

/// Display a product with an empty interest form.
#[instrument(skip(state, current_user))]
pub async fn product_detail(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let Some(product) = ProductRepository::new(state.pool()).get(id).await? else {
        return Ok(ProductDetailTemplate::missing(current_user).into_response());
    };

    Ok(ProductDetailTemplate {
        current_user: Some(current_user),
        product: Some(product),
        form: InterestForm::default(),
        errors: FieldErrors::new(),
        message: None,
    }
    .into_response())
}

/// Handle an interest submission.
///
/// "Yes" increments the product's interest counter and redirects home; "no"
/// and invalid submissions re-render the product page.
#[instrument(skip(state, current_user, form))]
pub async fn submit_interest(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    Path(id): Path<ProductId>,
    Form(form): Form<InterestForm>,
) -> Result<Response> {
    let products = ProductRepository::new(state.pool());
    let Some(product) = products.get(id).await? else {
        return Ok(ProductDetailTemplate::missing(current_user).into_response());
    };

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(ProductDetailTemplate {
                current_user: Some(current_user),
                product: Some(product),
                form,
                errors,
                message: None,
            }
            .into_response());
        }
    };

    if input.choice == InterestChoice::No {
        return Ok(ProductDetailTemplate {
            current_user: Some(current_user),
            product: Some(product),
            form,
            errors: FieldErrors::new(),
            message: None,
        }
        .into_response());
    }

    match products.increment_interest(id).await {
        Ok(counter) => {
            tracing::info!(
                product_id = %id,
                interested = counter,
                quantity = input.quantity,
                "Interest recorded"
            );
            Ok(Redirect::to("/").into_response())
        }
        Err(RepositoryError::NotFound) => {
            Ok(ProductDetailTemplate::missing(current_user).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
