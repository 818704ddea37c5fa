//! 采购单生命周期集成测试
//! 覆盖跨服务联动与并发状态转移，验证同一时刻只有一个转移生效

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use inventory_system::{
    error::AppError,
    models::{
        audit::AuditListFilters,
        movement::MovementListFilters,
        order::{CreateOrderRequest, OrderItemRequest, OrderStatus, RejectOrderRequest},
        product::CreateProductRequest,
        supplier::CreateSupplierRequest,
    },
    repository::{AuditRepository, MovementRepository},
};

mod common;
use common::{create_test_app, TestApp};

struct Fixture {
    app: TestApp,
    supplier_id: Uuid,
    actor_id: Uuid,
}

async fn setup() -> Fixture {
    let app = create_test_app();
    let actor_id = Uuid::new_v4();
    let supplier = app
        .state
        .supplier_service
        .create(
            CreateSupplierRequest {
                name: "Distribuidora Andes".to_string(),
                contact_email: None,
                phone: None,
            },
            actor_id,
        )
        .await
        .unwrap();

    Fixture {
        app,
        supplier_id: supplier.id,
        actor_id,
    }
}

async fn seed_product(fixture: &Fixture, min_stock: i64) -> Uuid {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    fixture
        .app
        .state
        .product_service
        .create(
            CreateProductRequest {
                name: "Lifecycle probe".to_string(),
                description: None,
                sku: format!("LIF-{}", suffix),
                unit_price: Decimal::new(500, 2),
                min_stock: Some(min_stock),
                supplier_id: None,
            },
            fixture.actor_id,
        )
        .await
        .unwrap()
        .id
}

async fn seed_order(fixture: &Fixture, items: Vec<(Uuid, i64)>) -> Uuid {
    let items = items
        .into_iter()
        .map(|(product_id, quantity)| OrderItemRequest {
            product_id,
            quantity,
            unit_cost: Decimal::ONE,
        })
        .collect();
    fixture
        .app
        .state
        .order_service
        .create(
            CreateOrderRequest {
                supplier_id: fixture.supplier_id,
                items,
            },
            fixture.actor_id,
        )
        .await
        .unwrap()
        .id
}

async fn order_net_movement(fixture: &Fixture, order_id: Uuid) -> i64 {
    let filters = MovementListFilters {
        order_id: Some(order_id),
        ..Default::default()
    };
    MovementRepository::new(fixture.app.state.gateway.clone())
        .list(&filters, 100, 0)
        .await
        .unwrap()
        .iter()
        .map(|m| m.direction.signed(m.quantity))
        .sum()
}

#[tokio::test]
async fn test_completed_order_restocks_low_stock_product() {
    let fixture = setup().await;
    let product_id = seed_product(&fixture, 5).await;

    // 现有量 0，低于下限
    let low = fixture
        .app
        .state
        .product_service
        .list_low_stock(50, 0)
        .await
        .unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].id, product_id);

    let order_id = seed_order(&fixture, vec![(product_id, 10)]).await;
    fixture
        .app
        .state
        .order_service
        .approve(order_id, fixture.actor_id)
        .await
        .unwrap();
    let completed = fixture
        .app
        .state
        .order_service
        .complete(order_id, fixture.actor_id)
        .await
        .unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);

    // 入账后脱离低库存名单
    let low = fixture
        .app
        .state
        .product_service
        .list_low_stock(50, 0)
        .await
        .unwrap();
    assert!(low.is_empty());

    let product = fixture
        .app
        .state
        .product_service
        .get(product_id)
        .await
        .unwrap();
    assert_eq!(product.quantity_on_hand, 10);

    // 三次状态变更各留一条审计
    let audits = AuditRepository::new(fixture.app.state.gateway.clone())
        .list(
            &AuditListFilters {
                entity_id: Some(order_id),
                ..Default::default()
            },
            50,
            0,
        )
        .await
        .unwrap();
    let mut actions: Vec<&str> = audits.iter().map(|r| r.action.as_str()).collect();
    actions.sort_unstable();
    assert_eq!(
        actions,
        vec![
            "purchase_order.approve",
            "purchase_order.complete",
            "purchase_order.create"
        ]
    );
}

#[tokio::test]
async fn test_completion_fails_when_line_product_deactivated() {
    let fixture = setup().await;
    let first = seed_product(&fixture, 0).await;
    let second = seed_product(&fixture, 0).await;
    let order_id = seed_order(&fixture, vec![(first, 4), (second, 6)]).await;

    fixture
        .app
        .state
        .order_service
        .approve(order_id, fixture.actor_id)
        .await
        .unwrap();

    // 第二行商品在完成前被下架
    fixture
        .app
        .state
        .product_service
        .delete(second, fixture.actor_id)
        .await
        .unwrap();

    let err = fixture
        .app
        .state
        .order_service
        .complete(order_id, fixture.actor_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // 第一行的入账被冲销，单据停留在 approved
    let order = fixture
        .app
        .state
        .order_service
        .get(order_id)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Approved);

    let product = fixture.app.state.product_service.get(first).await.unwrap();
    assert_eq!(product.quantity_on_hand, 0);
    assert_eq!(order_net_movement(&fixture, order_id).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_completion_applies_stock_once() {
    let fixture = setup().await;
    let product_id = seed_product(&fixture, 0).await;
    let order_id = seed_order(&fixture, vec![(product_id, 8)]).await;
    fixture
        .app
        .state
        .order_service
        .approve(order_id, fixture.actor_id)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..2 {
        let service = fixture.app.state.order_service.clone();
        handles.push(tokio::spawn(
            async move { service.complete(order_id, Uuid::new_v4()).await },
        ));
    }

    let mut ok_count = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(order) => {
                assert_eq!(order.status, OrderStatus::Completed);
                ok_count += 1;
            }
            Err(err) => assert!(
                matches!(err, AppError::InvalidState(_)),
                "unexpected error: {}",
                err
            ),
        }
    }
    assert_eq!(ok_count, 1);

    // 入账恰好一次，落败方的入账已冲销
    let product = fixture
        .app
        .state
        .product_service
        .get(product_id)
        .await
        .unwrap();
    assert_eq!(product.quantity_on_hand, 8);
    assert_eq!(order_net_movement(&fixture, order_id).await, 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_approve_reject_single_winner() {
    let fixture = setup().await;
    let product_id = seed_product(&fixture, 0).await;
    let order_id = seed_order(&fixture, vec![(product_id, 1)]).await;

    let approve_service = fixture.app.state.order_service.clone();
    let approve = tokio::spawn(async move {
        approve_service.approve(order_id, Uuid::new_v4()).await
    });
    let reject_service = fixture.app.state.order_service.clone();
    let reject = tokio::spawn(async move {
        reject_service
            .reject(
                order_id,
                RejectOrderRequest {
                    reason: "lost the race".to_string(),
                },
                Uuid::new_v4(),
            )
            .await
    });

    let approve_result = approve.await.unwrap();
    let reject_result = reject.await.unwrap();
    assert!(
        approve_result.is_ok() != reject_result.is_ok(),
        "exactly one transition must win"
    );

    let order = fixture
        .app
        .state
        .order_service
        .get(order_id)
        .await
        .unwrap();
    if approve_result.is_ok() {
        assert_eq!(order.status, OrderStatus::Approved);
    } else {
        assert_eq!(order.status, OrderStatus::Rejected);
        assert_eq!(order.rejection_reason.as_deref(), Some("lost the race"));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_delete_vs_approve_single_winner() {
    let fixture = setup().await;
    let product_id = seed_product(&fixture, 0).await;
    let order_id = seed_order(&fixture, vec![(product_id, 1)]).await;

    let approve_service = fixture.app.state.order_service.clone();
    let approve = tokio::spawn(async move {
        approve_service.approve(order_id, Uuid::new_v4()).await
    });
    let delete_service = fixture.app.state.order_service.clone();
    let delete = tokio::spawn(async move {
        delete_service.delete(order_id, Uuid::new_v4()).await
    });

    let approve_result = approve.await.unwrap();
    let delete_result = delete.await.unwrap();
    assert!(
        approve_result.is_ok() != delete_result.is_ok(),
        "exactly one operation must win"
    );

    let lookup = fixture.app.state.order_service.get(order_id).await;
    if approve_result.is_ok() {
        assert_eq!(lookup.unwrap().status, OrderStatus::Approved);
    } else {
        assert!(matches!(lookup.unwrap_err(), AppError::NotFound(_)));
    }
}
