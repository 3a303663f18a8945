//! Order ledger
//!
//! Creates orders, applies status transitions and answers the customer and
//! restaurant listings.

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::auth::CurrentUser;
use shared::error::{AppError, ErrorCode, ServiceResult};
use shared::identity::IdentityClient;
use shared::models::{Order, OrderCreate, OrderItem, OrderStatus, PaymentStatus};
use shared::util::{new_id, now_millis};
use shared::validation::{MAX_NAME_LEN, validate_required_text};

use crate::db::OrderStore;
use crate::restaurants::RestaurantLookup;

/// Whether status writes must follow the lifecycle graph.
///
/// Off: operators may set any status, including leaving a terminal state.
pub const ENFORCE_TRANSITION_GRAPH: bool = false;

/// The single decision point for status transitions
#[derive(Debug, Clone, Copy)]
pub struct TransitionPolicy {
    enforce_graph: bool,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self {
            enforce_graph: ENFORCE_TRANSITION_GRAPH,
        }
    }
}

impl TransitionPolicy {
    pub const fn permissive() -> Self {
        Self {
            enforce_graph: false,
        }
    }

    pub const fn strict() -> Self {
        Self {
            enforce_graph: true,
        }
    }

    pub fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<(), AppError> {
        if from.can_transition_to(to) {
            return Ok(());
        }
        if self.enforce_graph {
            return Err(AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                format!("Cannot move order from {from} to {to}"),
            )
            .with_detail("from", from.as_str())
            .with_detail("to", to.as_str()));
        }
        tracing::warn!(
            from = %from,
            to = %to,
            "Order status jump outside the lifecycle graph"
        );
        Ok(())
    }
}

/// Parse a wire status; missing and unknown values are validation errors
pub fn parse_status(raw: Option<&str>) -> Result<OrderStatus, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::required("orderStatus"))?;
    raw.parse::<OrderStatus>().map_err(|_| {
        AppError::with_message(
            ErrorCode::InvalidOrderStatus,
            format!("Unknown order status: {raw}"),
        )
        .with_detail("orderStatus", raw)
    })
}

#[derive(Clone)]
pub struct OrderLedger {
    store: Arc<dyn OrderStore>,
    identity: Arc<dyn IdentityClient>,
    restaurants: Arc<dyn RestaurantLookup>,
    policy: TransitionPolicy,
}

impl OrderLedger {
    pub fn new(
        store: Arc<dyn OrderStore>,
        identity: Arc<dyn IdentityClient>,
        restaurants: Arc<dyn RestaurantLookup>,
    ) -> Self {
        Self {
            store,
            identity,
            restaurants,
            policy: TransitionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Place an order in `ready-to-checkout`.
    ///
    /// The delivery address and coordinates are copied from the customer's
    /// profile at this moment and never refreshed.
    pub async fn create(&self, customer: &CurrentUser, body: OrderCreate) -> ServiceResult<Order> {
        let restaurant_id = body
            .restaurant_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::required("restaurantId"))?;
        let items = body.items.unwrap_or_default();
        if items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty).into());
        }
        validate_items(&items)?;
        let total_amount = body
            .total_amount
            .ok_or_else(|| AppError::required("totalAmount"))?;
        if total_amount <= Decimal::ZERO {
            return Err(AppError::new(ErrorCode::OrderInvalidTotal)
                .with_detail("totalAmount", total_amount.to_string())
                .into());
        }

        let profile = self.identity.fetch_profile(&customer.token).await?;

        let order = Order {
            id: new_id(),
            user_id: customer.id.clone(),
            restaurant_id,
            items,
            total_amount,
            payment_method: "cash".to_string(),
            payment_status: PaymentStatus::Pending,
            order_status: OrderStatus::default(),
            delivery_address: profile.address.clone().unwrap_or_default(),
            delivery_location: profile.coordinates(),
            created_at: now_millis(),
        };
        self.store.insert(&order).await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            restaurant_id = %order.restaurant_id,
            total = %order.total_amount,
            "Order created"
        );
        Ok(order)
    }

    /// Set the status of an order belonging to one of the caller's restaurants.
    pub async fn transition(
        &self,
        operator: &CurrentUser,
        order_id: &str,
        new_status: OrderStatus,
    ) -> ServiceResult<Order> {
        let order = self
            .store
            .find(order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))?;
        self.ensure_owner(operator, &order.restaurant_id).await?;
        self.policy.check(order.order_status, new_status)?;

        let updated = self
            .store
            .set_status(order_id, new_status)
            .await?
            .ok_or_else(|| order_not_found(order_id))?;

        tracing::info!(
            order_id = %order_id,
            from = %order.order_status,
            to = %new_status,
            operator_id = %operator.id,
            "Order status updated"
        );
        Ok(updated)
    }

    pub async fn list_by_customer(&self, customer: &CurrentUser) -> ServiceResult<Vec<Order>> {
        self.store.list_by_user(&customer.id).await
    }

    pub async fn list_by_restaurant(
        &self,
        operator: &CurrentUser,
        restaurant_id: &str,
        status: Option<OrderStatus>,
    ) -> ServiceResult<Vec<Order>> {
        self.ensure_owner(operator, restaurant_id).await?;
        self.store.list_by_restaurant(restaurant_id, status).await
    }

    async fn ensure_owner(&self, operator: &CurrentUser, restaurant_id: &str) -> ServiceResult<()> {
        let owner_id = self.restaurants.owner_of(restaurant_id).await?;
        if owner_id != operator.id {
            shared::security_log!(
                "WARN",
                "not_restaurant_owner",
                user_id = operator.id.clone(),
                restaurant_id = restaurant_id.to_string()
            );
            return Err(AppError::new(ErrorCode::NotRestaurantOwner)
                .with_detail("restaurantId", restaurant_id)
                .into());
        }
        Ok(())
    }
}

fn order_not_found(id: &str) -> AppError {
    AppError::new(ErrorCode::OrderNotFound).with_detail("orderId", id)
}

fn validate_items(items: &[OrderItem]) -> Result<(), AppError> {
    for (index, item) in items.iter().enumerate() {
        validate_required_text(&item.name, &format!("items[{index}].name"), MAX_NAME_LEN)?;
        if item.price < Decimal::ZERO {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("items[{index}].price must not be negative"),
            ));
        }
        if item.quantity == 0 {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("items[{index}].quantity must be at least 1"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryOrderStore;
    use async_trait::async_trait;
    use shared::error::AppResult;
    use shared::geo::Coordinates;
    use shared::identity::{PartialLocation, Profile};
    use shared::models::Role;
    use std::collections::HashMap;

    struct FakeIdentity(Profile);

    #[async_trait]
    impl IdentityClient for FakeIdentity {
        async fn fetch_profile(&self, _token: &str) -> AppResult<Profile> {
            Ok(self.0.clone())
        }
    }

    struct FakeRestaurants(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl RestaurantLookup for FakeRestaurants {
        async fn owner_of(&self, restaurant_id: &str) -> AppResult<String> {
            self.0
                .get(restaurant_id)
                .map(|o| o.to_string())
                .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))
        }
    }

    fn ledger(profile: Profile) -> OrderLedger {
        OrderLedger::new(
            Arc::new(MemoryOrderStore::new()),
            Arc::new(FakeIdentity(profile)),
            Arc::new(FakeRestaurants(HashMap::from([("r1", "o1"), ("r2", "o2")]))),
        )
    }

    fn user(id: &str, role: Role) -> CurrentUser {
        CurrentUser {
            id: id.into(),
            role,
            token: "tok".into(),
        }
    }

    fn item(price: i64, quantity: u32) -> OrderItem {
        OrderItem {
            menu_item_id: Some("m1".into()),
            name: "Kottu".into(),
            price: Decimal::new(price, 0),
            quantity,
        }
    }

    fn body(restaurant: &str, items: Vec<OrderItem>, total: i64) -> OrderCreate {
        OrderCreate {
            restaurant_id: Some(restaurant.into()),
            items: Some(items),
            total_amount: Some(Decimal::new(total, 0)),
        }
    }

    fn home() -> Profile {
        Profile {
            address: Some("5 Flower Road".into()),
            location: Some(PartialLocation {
                latitude: Some(6.91),
                longitude: Some(79.86),
            }),
            ..Default::default()
        }
    }

    fn code(e: shared::error::ServiceError) -> ErrorCode {
        AppError::from(e).code
    }

    #[tokio::test]
    async fn create_snapshots_profile() {
        let l = ledger(home());
        let order = l
            .create(&user("c1", Role::Customer), body("r1", vec![item(850, 2)], 1700))
            .await
            .unwrap();
        assert_eq!(order.order_status, OrderStatus::ReadyToCheckout);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.payment_method, "cash");
        assert_eq!(order.delivery_address, "5 Flower Road");
        assert_eq!(order.delivery_location, Some(Coordinates::new(6.91, 79.86)));
    }

    #[tokio::test]
    async fn profile_without_location_gives_null_location() {
        let l = ledger(Profile::default());
        let order = l
            .create(&user("c1", Role::Customer), body("r1", vec![item(100, 1)], 100))
            .await
            .unwrap();
        assert_eq!(order.delivery_location, None);
        assert_eq!(order.delivery_address, "");
    }

    #[tokio::test]
    async fn create_rejects_bad_input() {
        let l = ledger(home());
        let c = user("c1", Role::Customer);

        let e = l.create(&c, body("r1", vec![], 100)).await.unwrap_err();
        assert_eq!(code(e), ErrorCode::OrderEmpty);

        let e = l.create(&c, body("r1", vec![item(1, 1)], 0)).await.unwrap_err();
        assert_eq!(code(e), ErrorCode::OrderInvalidTotal);

        let e = l.create(&c, body("r1", vec![item(1, 1)], -5)).await.unwrap_err();
        assert_eq!(code(e), ErrorCode::OrderInvalidTotal);

        let e = l.create(&c, body("r1", vec![item(1, 0)], 5)).await.unwrap_err();
        assert_eq!(code(e), ErrorCode::ValueOutOfRange);

        let e = l.create(&c, body(" ", vec![item(1, 1)], 5)).await.unwrap_err();
        assert_eq!(code(e), ErrorCode::RequiredField);

        let e = l.create(&c, OrderCreate::default()).await.unwrap_err();
        assert_eq!(code(e), ErrorCode::RequiredField);
    }

    #[tokio::test]
    async fn arbitrary_jump_is_accepted() {
        let l = ledger(home());
        let order = l
            .create(&user("c1", Role::Customer), body("r1", vec![item(1, 1)], 1))
            .await
            .unwrap();
        let op = user("o1", Role::RestaurantAdmin);

        let done = l
            .transition(&op, &order.id, OrderStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.order_status, OrderStatus::Completed);

        // out of a terminal state as well
        let back = l
            .transition(&op, &order.id, OrderStatus::Preparing)
            .await
            .unwrap();
        assert_eq!(back.order_status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn strict_policy_enforces_graph() {
        let l = ledger(home()).with_policy(TransitionPolicy::strict());
        let order = l
            .create(&user("c1", Role::Customer), body("r1", vec![item(1, 1)], 1))
            .await
            .unwrap();
        let op = user("o1", Role::RestaurantAdmin);

        let e = l
            .transition(&op, &order.id, OrderStatus::Completed)
            .await
            .unwrap_err();
        assert_eq!(code(e), ErrorCode::InvalidStatusTransition);

        let placed = l
            .transition(&op, &order.id, OrderStatus::OrderPlaced)
            .await
            .unwrap();
        assert_eq!(placed.order_status, OrderStatus::OrderPlaced);
    }

    #[tokio::test]
    async fn transition_checks_owner_and_existence() {
        let l = ledger(home());
        let order = l
            .create(&user("c1", Role::Customer), body("r1", vec![item(1, 1)], 1))
            .await
            .unwrap();

        let e = l
            .transition(&user("o2", Role::RestaurantAdmin), &order.id, OrderStatus::Confirmed)
            .await
            .unwrap_err();
        assert_eq!(code(e), ErrorCode::NotRestaurantOwner);

        let e = l
            .transition(&user("o1", Role::RestaurantAdmin), "missing", OrderStatus::Confirmed)
            .await
            .unwrap_err();
        assert_eq!(code(e), ErrorCode::OrderNotFound);
    }

    #[tokio::test]
    async fn listings_keep_insertion_order() {
        let l = ledger(home());
        let c1 = user("c1", Role::Customer);
        let c2 = user("c2", Role::Customer);
        let a = l.create(&c1, body("r1", vec![item(1, 1)], 1)).await.unwrap();
        let b = l.create(&c2, body("r1", vec![item(1, 1)], 1)).await.unwrap();
        let c = l.create(&c1, body("r2", vec![item(1, 1)], 1)).await.unwrap();

        let mine: Vec<_> = l
            .list_by_customer(&c1)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(mine, [a.id.clone(), c.id.clone()]);

        let op = user("o1", Role::RestaurantAdmin);
        l.transition(&op, &b.id, OrderStatus::OrderPlaced)
            .await
            .unwrap();

        let all: Vec<_> = l
            .list_by_restaurant(&op, "r1", None)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(all, [a.id.clone(), b.id.clone()]);

        let placed = l
            .list_by_restaurant(&op, "r1", Some(OrderStatus::OrderPlaced))
            .await
            .unwrap();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].id, b.id);

        let e = l.list_by_restaurant(&op, "r2", None).await.unwrap_err();
        assert_eq!(code(e), ErrorCode::NotRestaurantOwner);
    }

    #[test]
    fn status_parsing() {
        assert_eq!(parse_status(Some("on-the-way")).unwrap(), OrderStatus::OnTheWay);
        assert_eq!(
            parse_status(Some("delivered")).unwrap_err().code,
            ErrorCode::InvalidOrderStatus
        );
        assert_eq!(parse_status(None).unwrap_err().code, ErrorCode::RequiredField);
    }

    #[test]
    fn permissive_policy_allows_anything() {
        let p = TransitionPolicy::permissive();
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(p.check(*from, *to).is_ok());
            }
        }
        assert!(!TransitionPolicy::default().enforce_graph);
    }
}
