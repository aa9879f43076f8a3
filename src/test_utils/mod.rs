#![allow(missing_docs)]

//! Shared fixtures for unit and endpoint tests.

use axum::{http::StatusCode, http::header::SET_COOKIE, response::IntoResponse};
use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
use axum_test::{TestResponse, TestServer};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::Value;
use time::Date;

use crate::{
    AppState, CategoryId, TransactionType, build_router,
    account::get_accounts,
    auth::{DEFAULT_COOKIE_DURATION, set_auth_cookie},
    category::get_categories,
    database_id::AccountId,
    db::initialize,
    transaction::{Transaction, create_transaction},
    user::{UserID, register_user},
};

pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

/// A registered user along with the IDs of their seeded accounts and categories.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TestLedger {
    pub user_id: UserID,
    pub cash: AccountId,
    pub card: AccountId,
    pub food: CategoryId,
    pub transport: CategoryId,
    pub salary: CategoryId,
    pub freelance: CategoryId,
}

impl TestLedger {
    pub fn new(connection: &Connection) -> Self {
        Self::with_email("test@example.com", connection)
    }

    pub fn with_email(email: &str, connection: &Connection) -> Self {
        let user = register_user(email, connection).expect("Could not register test user");
        let accounts = get_accounts(user.id, connection).expect("Could not get accounts");
        let categories =
            get_categories(user.id, None, connection).expect("Could not get categories");

        let account = |name: &str| {
            accounts
                .iter()
                .find(|account| account.name.as_ref() == name)
                .unwrap_or_else(|| panic!("missing seeded account {name}"))
                .id
        };
        let category = |name: &str, category_type: TransactionType| {
            categories
                .iter()
                .find(|category| {
                    category.name.as_ref() == name && category.category_type == category_type
                })
                .unwrap_or_else(|| panic!("missing seeded category {name}"))
                .id
        };

        Self {
            user_id: user.id,
            cash: account("Cash"),
            card: account("Card"),
            food: category("Food", TransactionType::Expense),
            transport: category("Transport", TransactionType::Expense),
            salary: category("Salary", TransactionType::Income),
            freelance: category("Freelance", TransactionType::Income),
        }
    }

    /// Record a food expense paid with cash.
    pub fn expense(&self, amount: Decimal, date: Date, connection: &Connection) -> Transaction {
        self.expense_in(self.food, amount, date, connection)
    }

    /// Record an expense in `category_id` paid with cash.
    pub fn expense_in(
        &self,
        category_id: CategoryId,
        amount: Decimal,
        date: Date,
        connection: &Connection,
    ) -> Transaction {
        create_transaction(
            self.user_id,
            Transaction::build(
                amount,
                TransactionType::Expense,
                date,
                category_id,
                self.cash,
            ),
            connection,
        )
        .expect("Could not create test expense")
    }

    /// Record salary paid into cash.
    pub fn income(&self, amount: Decimal, date: Date, connection: &Connection) -> Transaction {
        create_transaction(
            self.user_id,
            Transaction::build(
                amount,
                TransactionType::Income,
                date,
                self.salary,
                self.cash,
            ),
            connection,
        )
        .expect("Could not create test income")
    }
}

/// The full app running on an in-memory database with one registered user.
pub(crate) struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub ledger: TestLedger,
}

impl TestApp {
    pub fn new() -> Self {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(connection, "42", "Etc/UTC").expect("Could not create state");
        let ledger = {
            let connection = state.db_connection.lock().expect("Could not lock database");
            TestLedger::new(&connection)
        };
        let server =
            TestServer::new(build_router(state.clone())).expect("Could not create test server.");

        Self {
            server,
            state,
            ledger,
        }
    }

    /// An auth cookie for the default test user.
    pub fn auth_cookie(&self) -> Cookie<'static> {
        self.auth_cookie_for(self.ledger.user_id)
    }

    /// An auth cookie for `user_id`, encrypted with the app's key.
    pub fn auth_cookie_for(&self, user_id: UserID) -> Cookie<'static> {
        let jar = PrivateCookieJar::new(self.state.cookie_key.clone());
        let response = set_auth_cookie(jar, user_id, DEFAULT_COOKIE_DURATION)
            .expect("Could not set auth cookie")
            .into_response();
        let header = response
            .headers()
            .get(SET_COOKIE)
            .expect("Missing set-cookie header")
            .to_str()
            .expect("Set-cookie header is not valid text");

        Cookie::parse(header.to_owned()).expect("Could not parse auth cookie")
    }

    /// Run `f` against the app's database.
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        let connection = self
            .state
            .db_connection
            .lock()
            .expect("Could not lock database");
        f(&connection)
    }

    /// Register another user with the app.
    pub fn register(&self, email: &str) -> TestLedger {
        self.with_connection(|connection| TestLedger::with_email(email, connection))
    }
}

/// Assert that `response` is an error with `status` and the JSON error code `code`.
#[track_caller]
pub(crate) fn assert_error_code(response: &TestResponse, status: StatusCode, code: &str) {
    response.assert_status(status);

    let body = response.json::<Value>();
    assert_eq!(
        body["code"], code,
        "got error body {body}, want code {code}"
    );
    assert!(
        body["error"].as_str().is_some_and(|message| !message.is_empty()),
        "error message missing from {body}"
    );
}
