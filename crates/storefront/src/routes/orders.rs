//! Order placement and order history route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use windsor_goods_core::forms::{FieldErrors, OrderForm};

use crate::db::{ClientRepository, Placement, ProductRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Client, CurrentUser, Order, Product};
use crate::services::{OrderError, OrderService};
use crate::state::AppState;

/// Order form template.
#[derive(Template, WebTemplate)]
#[template(path = "place_order.html")]
pub struct PlaceOrderTemplate {
    pub current_user: Option<CurrentUser>,
    pub clients: Vec<Client>,
    pub products: Vec<Product>,
    pub form: OrderForm,
    pub errors: FieldErrors,
    pub message: Option<&'static str>,
}

/// Refused order template.
#[derive(Template, WebTemplate)]
#[template(path = "order_response.html")]
pub struct OrderResponseTemplate {
    pub current_user: Option<CurrentUser>,
    pub message: &'static str,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "my_orders.html")]
pub struct MyOrdersTemplate {
    pub current_user: Option<CurrentUser>,
    pub message: String,
    pub products: Vec<String>,
    pub orders: Vec<Order>,
}

/// Render the order form with its choice lists.
async fn order_page(
    state: &AppState,
    current_user: CurrentUser,
    form: OrderForm,
    errors: FieldErrors,
    message: Option<&'static str>,
) -> Result<Response> {
    let clients = ClientRepository::new(state.pool()).list().await?;
    let products = ProductRepository::new(state.pool()).all().await?;

    Ok(PlaceOrderTemplate {
        current_user: Some(current_user),
        clients,
        products,
        form,
        errors,
        message,
    }
    .into_response())
}

/// Display the order form.
#[instrument(skip(state, current_user))]
pub async fn place_order_page(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
) -> Result<Response> {
    order_page(
        &state,
        current_user,
        OrderForm::default(),
        FieldErrors::new(),
        None,
    )
    .await
}

/// Handle an order submission.
///
/// Accepted orders re-render a fresh form with the success message; orders
/// refused for stock get their own page.
#[instrument(skip(state, current_user, form))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    Form(form): Form<OrderForm>,
) -> Result<Response> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return order_page(&state, current_user, form, errors, None).await,
    };

    let outcome = match OrderService::new(state.pool()).place(&input).await {
        Ok(outcome) => outcome,
        Err(OrderError::ClientNotFound) => {
            let mut errors = FieldErrors::new();
            errors.add("client", "Select a valid choice.");
            return order_page(&state, current_user, form, errors, None).await;
        }
        Err(OrderError::ProductNotFound) => {
            let mut errors = FieldErrors::new();
            errors.add("product", "Select a valid choice.");
            return order_page(&state, current_user, form, errors, None).await;
        }
        Err(e) => return Err(e.into()),
    };

    match outcome {
        Placement::Accepted { .. } => {
            order_page(
                &state,
                current_user,
                OrderForm::default(),
                FieldErrors::new(),
                Some(outcome.message()),
            )
            .await
        }
        Placement::Rejected(_) => Ok(OrderResponseTemplate {
            current_user: Some(current_user),
            message: outcome.message(),
        }
        .into_response()),
    }
}

/// Display the distinct products the logged-in user's client has ordered,
/// followed by each order's status and cost.
#[instrument(skip(state, current_user))]
pub async fn my_orders(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
) -> Result<Response> {
    let history = OrderService::new(state.pool())
        .history(current_user.id)
        .await?;

    Ok(MyOrdersTemplate {
        current_user: Some(current_user),
        message: history.summary.message,
        products: history.summary.products,
        orders: history.orders,
    }
    .into_response())
}
