//! Ledger posting integration tests: two-sided transactions and journals.

mod common;

use common::TestApp;
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
#[ignore]
async fn cash_sale_increases_both_balances() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login().await;

    let cash = app.create_account(&token, "1000", "Cash", "asset", 0.0).await;
    let sales = app
        .create_account(&token, "4000", "Sales", "revenue", 0.0)
        .await;

    let response = app.post_transaction(&token, cash, sales, 100.0).await;
    assert_eq!(response.status().as_u16(), 201);

    // Debit-normal asset goes up, credit-normal revenue also goes up
    assert_eq!(app.get_account(&token, cash).await["balance"], "100.00");
    assert_eq!(app.get_account(&token, sales).await["balance"], "100.00");
}

#[tokio::test]
#[ignore]
async fn expense_paid_from_cash_moves_balances() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login().await;

    let cash = app
        .create_account(&token, "1000", "Cash", "asset", 500.0)
        .await;
    let rent = app
        .create_account(&token, "6000", "Rent", "expense", 0.0)
        .await;

    let response = app.post_transaction(&token, rent, cash, 200.0).await;
    assert_eq!(response.status().as_u16(), 201);

    assert_eq!(app.get_account(&token, rent).await["balance"], "200.00");
    assert_eq!(app.get_account(&token, cash).await["balance"], "300.00");
}

#[tokio::test]
#[ignore]
async fn rejects_same_account_on_both_sides() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login().await;

    let cash = app.create_account(&token, "1000", "Cash", "asset", 0.0).await;

    let response = app.post_transaction(&token, cash, cash, 50.0).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
#[ignore]
async fn rejects_non_positive_amount() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login().await;

    let cash = app.create_account(&token, "1000", "Cash", "asset", 0.0).await;
    let sales = app
        .create_account(&token, "4000", "Sales", "revenue", 0.0)
        .await;

    let response = app.post_transaction(&token, cash, sales, 0.0).await;
    assert_eq!(response.status().as_u16(), 400);

    let response = app.post_transaction(&token, cash, sales, -10.0).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
#[ignore]
async fn rejects_unknown_account() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login().await;

    let cash = app.create_account(&token, "1000", "Cash", "asset", 0.0).await;

    let response = app
        .post_transaction(&token, cash, Uuid::new_v4(), 50.0)
        .await;
    assert_eq!(response.status().as_u16(), 400);

    // Nothing was written
    assert_eq!(app.get_account(&token, cash).await["balance"], "0.00");
}

#[tokio::test]
#[ignore]
async fn rejects_inactive_account() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login().await;

    let cash = app.create_account(&token, "1000", "Cash", "asset", 0.0).await;

    let response = app
        .client
        .post(format!("{}/accounts", app.address))
        .bearer_auth(&token)
        .json(&json!({
            "code": "9000",
            "name": "Closed",
            "type": "expense",
            "is_active": false
        }))
        .send()
        .await
        .unwrap();
    let closed: Value = response.json().await.unwrap();
    let closed = Uuid::parse_str(closed["id"].as_str().unwrap()).unwrap();

    let response = app.post_transaction(&token, closed, cash, 50.0).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
#[ignore]
async fn draft_transaction_leaves_balances_untouched() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login().await;

    let cash = app.create_account(&token, "1000", "Cash", "asset", 0.0).await;
    let sales = app
        .create_account(&token, "4000", "Sales", "revenue", 0.0)
        .await;

    let response = app
        .client
        .post(format!("{}/transactions", app.address))
        .bearer_auth(&token)
        .json(&json!({
            "date": "2026-01-15",
            "reference": "DRAFT-1",
            "description": "pending entry",
            "debit_account": cash,
            "credit_account": sales,
            "amount": 75.0,
            "status": "draft"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    assert_eq!(app.get_account(&token, cash).await["balance"], "0.00");
    assert_eq!(app.get_account(&token, sales).await["balance"], "0.00");
}

#[tokio::test]
#[ignore]
async fn list_transactions_filters_by_account_and_date() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login().await;

    let cash = app.create_account(&token, "1000", "Cash", "asset", 0.0).await;
    let sales = app
        .create_account(&token, "4000", "Sales", "revenue", 0.0)
        .await;
    let rent = app
        .create_account(&token, "6000", "Rent", "expense", 0.0)
        .await;

    app.post_transaction(&token, cash, sales, 100.0).await;
    app.post_transaction(&token, rent, cash, 40.0).await;

    let response = app
        .client
        .get(format!("{}/transactions?account_id={}", app.address, sales))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Vec<Value> = response.json().await.unwrap();
    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["credit_account_name"], "Sales");

    let response = app
        .client
        .get(format!(
            "{}/transactions?start_date=2030-01-01",
            app.address
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Vec<Value> = response.json().await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
#[ignore]
async fn get_transaction_includes_account_names_and_creator() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login().await;

    let cash = app.create_account(&token, "1000", "Cash", "asset", 0.0).await;
    let sales = app
        .create_account(&token, "4000", "Sales", "revenue", 0.0)
        .await;

    let created: Value = app
        .post_transaction(&token, cash, sales, 100.0)
        .await
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let response = app
        .client
        .get(format!("{}/transactions/{}", app.address, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["debit_account_name"], "Cash");
    assert_eq!(body["credit_account_name"], "Sales");
    assert!(body["created_by_username"].as_str().is_some());
    assert!(body["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn get_transaction_returns_404_for_unknown_id() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login().await;

    let response = app
        .client
        .get(format!(
            "{}/transactions/{}",
            app.address,
            Uuid::new_v4()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
#[ignore]
async fn balanced_journal_posts_and_updates_balances() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login().await;

    let cash = app.create_account(&token, "1000", "Cash", "asset", 0.0).await;
    let sales = app
        .create_account(&token, "4000", "Sales", "revenue", 0.0)
        .await;
    let fees = app
        .create_account(&token, "6100", "Card Fees", "expense", 0.0)
        .await;

    // Sale of 100 settled as 97 cash plus 3 processing fee
    let response = app
        .client
        .post(format!("{}/transactions", app.address))
        .bearer_auth(&token)
        .json(&json!({
            "date": "2026-01-20",
            "reference": "JRN-1",
            "description": "card settlement",
            "entries": [
                { "account_id": cash, "debit": 97.0 },
                { "account_id": fees, "debit": 3.0 },
                { "account_id": sales, "credit": 100.0 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();

    assert_eq!(app.get_account(&token, cash).await["balance"], "97.00");
    assert_eq!(app.get_account(&token, fees).await["balance"], "3.00");
    assert_eq!(app.get_account(&token, sales).await["balance"], "100.00");

    // Detail view carries the legs
    let detail: Value = app
        .client
        .get(format!(
            "{}/transactions/{}",
            app.address,
            created["id"].as_str().unwrap()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["entries"].as_array().unwrap().len(), 3);
    assert!(detail["amount"].is_null());
}

#[tokio::test]
#[ignore]
async fn rejects_unbalanced_journal() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login().await;

    let cash = app.create_account(&token, "1000", "Cash", "asset", 0.0).await;
    let sales = app
        .create_account(&token, "4000", "Sales", "revenue", 0.0)
        .await;

    let response = app
        .client
        .post(format!("{}/transactions", app.address))
        .bearer_auth(&token)
        .json(&json!({
            "date": "2026-01-20",
            "entries": [
                { "account_id": cash, "debit": 100.0 },
                { "account_id": sales, "credit": 90.0 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    assert_eq!(app.get_account(&token, cash).await["balance"], "0.00");
    assert_eq!(app.get_account(&token, sales).await["balance"], "0.00");
}

#[tokio::test]
#[ignore]
async fn rejects_single_entry_journal() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login().await;

    let cash = app.create_account(&token, "1000", "Cash", "asset", 0.0).await;

    let response = app
        .client
        .post(format!("{}/transactions", app.address))
        .bearer_auth(&token)
        .json(&json!({
            "date": "2026-01-20",
            "entries": [ { "account_id": cash, "debit": 100.0 } ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}
