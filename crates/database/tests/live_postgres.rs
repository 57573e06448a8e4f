//! The queries against a real, seeded PostgreSQL.
//!
//! Every test starts its own container, so these need Docker and are skipped
//! by default. Run them with:
//!
//! ```text
//! cargo test -p database --test live_postgres -- --ignored
//! ```

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use configuration::DbSettings;
use database::{
    ConnectionProvider, Customer, DbError, LenientRepository, PersonName, Product, Sale,
    SalesRepository, Table, Value,
};
use rstest::rstest;
use rust_decimal_macros::dec;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, ContainerRequest, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;

/// A small copy of the sales schema. Identifiers are unquoted `CamelCase`
/// like the production database, so PostgreSQL folds them to lowercase.
const SCHEMA: &str = r#"
    CREATE TABLE categories (
        CategoryID   integer PRIMARY KEY,
        CategoryName varchar(45) NOT NULL
    );
    CREATE TABLE countries (
        CountryID   integer PRIMARY KEY,
        CountryName varchar(45) NOT NULL,
        CountryCode varchar(2) NOT NULL
    );
    CREATE TABLE cities (
        CityID    integer PRIMARY KEY,
        CityName  varchar(45) NOT NULL,
        Zipcode   varchar(10) NOT NULL,
        CountryID integer NOT NULL REFERENCES countries (CountryID)
    );
    CREATE TABLE customers (
        CustomerID    integer PRIMARY KEY,
        FirstName     varchar(45) NOT NULL,
        MiddleInitial varchar(1),
        LastName      varchar(45) NOT NULL,
        Address       varchar(90),
        CityID        integer NOT NULL REFERENCES cities (CityID),
        CountryID     integer NOT NULL REFERENCES countries (CountryID)
    );
    CREATE TABLE employees (
        EmployeeID    integer PRIMARY KEY,
        FirstName     varchar(45) NOT NULL,
        MiddleInitial varchar(1),
        LastName      varchar(45) NOT NULL,
        BirthDate     date NOT NULL,
        Gender        varchar(10),
        CityID        integer NOT NULL REFERENCES cities (CityID),
        HireDate      date NOT NULL
    );
    CREATE TABLE products (
        ProductID    integer PRIMARY KEY,
        ProductName  varchar(45) NOT NULL,
        Price        numeric(10, 4) NOT NULL,
        CategoryID   integer NOT NULL REFERENCES categories (CategoryID),
        Class        varchar(15),
        ModifyDate   date,
        Resistant    varchar(15),
        IsAllergic   varchar(10),
        VitalityDays integer
    );
    CREATE TABLE sales (
        SalesID           integer PRIMARY KEY,
        SalesPersonID     integer NOT NULL REFERENCES employees (EmployeeID),
        CustomerID        integer NOT NULL REFERENCES customers (CustomerID),
        ProductID         integer NOT NULL REFERENCES products (ProductID),
        Quantity          integer NOT NULL,
        Discount          numeric(10, 2) NOT NULL,
        TotalPrice        numeric(10, 2) NOT NULL,
        SalesDate         timestamp,
        TransactionNumber varchar(25) NOT NULL
    );

    INSERT INTO categories VALUES (1, 'Dairy'), (2, 'Bakery');
    INSERT INTO countries VALUES (1, 'USA', 'US'), (2, 'Canada', 'CA');
    INSERT INTO cities VALUES (1, 'Austin', '73301', 1), (2, 'Toronto', 'M5H', 2);
    INSERT INTO customers VALUES
        (1, 'Juan', 'A', 'Perez', '12 Main St', 1, 1),
        (2, 'Ana', NULL, 'Gomez', NULL, 2, 2),
        (3, 'Luis', NULL, 'Diaz', NULL, 1, 1);
    INSERT INTO employees VALUES
        (1, 'Marta', NULL, 'Ruiz', '1985-04-02', 'F', 1, '2015-06-01');
    INSERT INTO products VALUES
        (1, 'Milk',   2.5000, 1, 'Low',    '2018-01-01', 'Durable', 'Unknown', 7),
        (2, 'Cheese', 7.2500, 1, 'Medium', '2018-01-01', 'Durable', 'TRUE',    30),
        (3, 'Yogurt', 1.1000, 1, 'Low',    NULL,         NULL,      'FALSE',   NULL),
        (4, 'Butter', 4.0000, 1, 'Medium', NULL,         NULL,      NULL,      NULL),
        (5, 'Bread',  3.0000, 2, 'Low',    NULL,         NULL,      NULL,      3),
        (6, 'Bagel',  1.5000, 2, 'Low',    NULL,         NULL,      NULL,      2);
    INSERT INTO sales VALUES
        (1, 1, 1, 1, 10, 0.00, 25.00, '2018-01-05 10:00:00', 'T0001'),
        (2, 1, 1, 2,  8, 0.00, 58.00, '2018-01-12 11:30:00', 'T0002'),
        (3, 1, 2, 3,  6, 0.10,  5.94, '2018-02-03 09:15:00', 'T0003'),
        (4, 1, 2, 4,  2, 0.00,  8.00, '2018-02-10 16:45:00', 'T0004'),
        (5, 1, 1, 5,  5, 0.00, 15.00, '2018-02-20 08:00:00', 'T0005'),
        (6, 1, 2, 6,  3, 0.00,  4.50, NULL,                  'T0006');

    CREATE VIEW v_ventas_detalladas AS
        SELECT
            s.SalesID,
            s.SalesDate,
            s.Quantity,
            s.TotalPrice,
            p.ProductName,
            c.CategoryName,
            cu.FirstName,
            cu.LastName
        FROM sales s
        JOIN products p ON s.ProductID = p.ProductID
        JOIN categories c ON p.CategoryID = c.CategoryID
        JOIN customers cu ON s.CustomerID = cu.CustomerID;

    CREATE FUNCTION sp_reporte_cliente(p_customer_id integer)
    RETURNS TABLE (ProductName varchar, TotalSpent numeric, LastPurchase timestamp)
    AS $$
        SELECT p.ProductName, SUM(s.TotalPrice), MAX(s.SalesDate)
        FROM sales s
        JOIN products p ON s.ProductID = p.ProductID
        WHERE s.CustomerID = p_customer_id
        GROUP BY p.ProductName
        ORDER BY SUM(s.TotalPrice) DESC
    $$ LANGUAGE sql;
"#;

/// A running PostgreSQL container with the schema above loaded.
struct SeededDatabase {
    provider: Arc<ConnectionProvider>,
    _container: ContainerAsync<Postgres>,
}

impl SeededDatabase {
    fn repository(&self) -> SalesRepository {
        SalesRepository::connect(Arc::clone(&self.provider))
    }

    async fn pool(&self) -> &PgPool {
        self.provider.get_handle().await.unwrap()
    }
}

/// Starts PostgreSQL 15 and seeds it.
///
/// # Errors
/// Returns an error if the container fails to start or the seed script fails.
async fn bring_up_seeded_postgres() -> anyhow::Result<SeededDatabase> {
    let container = ContainerRequest::from(Postgres::default())
        .with_tag("15-alpine")
        .with_env_var("POSTGRES_PASSWORD", "pass")
        .with_env_var("POSTGRES_USER", "user")
        .with_env_var("POSTGRES_DB", "sales")
        .start()
        .await?;
    let port = container.get_host_port_ipv4(5432).await?;

    let settings = DbSettings {
        user: "user".to_string(),
        password: "pass".to_string(),
        host: "127.0.0.1".to_string(),
        port,
        database: "sales".to_string(),
        max_connections: 2,
        acquire_timeout: Duration::from_secs(20),
    };
    let provider = Arc::new(ConnectionProvider::with_loader(move || Ok(settings.clone())));

    let pool = provider.get_handle().await?;
    sqlx::raw_sql(SCHEMA).execute(pool).await?;

    Ok(SeededDatabase {
        provider,
        _container: container,
    })
}

fn timestamp(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

#[tokio::test]
#[ignore = "starts a PostgreSQL container"]
async fn test_sales_summary_by_country() {
    let db = bring_up_seeded_postgres().await.unwrap();

    let table = db.repository().sales_summary_by_country().await.unwrap();

    assert_eq!(
        table.columns(),
        ["countryname", "totaltransactions", "totalrevenue"]
    );
    assert_eq!(
        table.rows(),
        [
            vec![text("USA"), Value::Int(3), Value::Decimal(dec!(98.00))],
            vec![text("Canada"), Value::Int(3), Value::Decimal(dec!(18.44))],
        ]
    );
}

#[rstest]
#[case(1, &[("Bakery", "Bread"), ("Dairy", "Milk")])]
#[case(2, &[("Bakery", "Bread"), ("Bakery", "Bagel"), ("Dairy", "Milk"), ("Dairy", "Cheese")])]
#[case(3, &[("Bakery", "Bread"), ("Bakery", "Bagel"), ("Dairy", "Milk"), ("Dairy", "Cheese"), ("Dairy", "Yogurt")])]
#[tokio::test]
#[ignore = "starts a PostgreSQL container"]
async fn test_top_products_limit_applies_per_category(
    #[case] limit: u32,
    #[case] expected: &[(&str, &str)],
) {
    let db = bring_up_seeded_postgres().await.unwrap();

    let table = db
        .repository()
        .top_products_per_category(NonZeroU32::new(limit).unwrap())
        .await
        .unwrap();

    assert_eq!(
        table.columns(),
        ["categoryname", "productname", "totalquantitysold"]
    );
    let ranked: Vec<(Value, Value)> = table
        .rows()
        .iter()
        .map(|row| (row[0].clone(), row[1].clone()))
        .collect();
    let expected: Vec<(Value, Value)> = expected
        .iter()
        .map(|(category, product)| (text(category), text(product)))
        .collect();
    assert_eq!(ranked, expected);
    assert_eq!(table.value(0, "totalquantitysold"), Some(&Value::Int(5)));
}

#[tokio::test]
#[ignore = "starts a PostgreSQL container"]
async fn test_monthly_growth_is_null_for_the_first_month() {
    let db = bring_up_seeded_postgres().await.unwrap();

    let table = db.repository().monthly_sales_growth().await.unwrap();

    // The sale without a date is left out of every month.
    assert_eq!(table.len(), 2);
    assert_eq!(table.value(0, "salemonth"), Some(&text("2018-01")));
    assert_eq!(table.value(0, "monthlyrevenue"), Some(&Value::Decimal(dec!(83.00))));
    assert_eq!(table.value(0, "previousmonthrevenue"), Some(&Value::Decimal(dec!(0))));
    assert_eq!(table.value(0, "growthpercentage"), Some(&Value::Null));

    assert_eq!(table.value(1, "salemonth"), Some(&text("2018-02")));
    assert_eq!(table.value(1, "monthlyrevenue"), Some(&Value::Decimal(dec!(28.94))));
    assert_eq!(table.value(1, "previousmonthrevenue"), Some(&Value::Decimal(dec!(83.00))));
    match table.value(1, "growthpercentage") {
        Some(Value::Decimal(growth)) => assert_eq!(growth.round_dp(2), dec!(-65.13)),
        other => panic!("Expected a decimal growth, got {other:?}"),
    }
}

#[tokio::test]
#[ignore = "starts a PostgreSQL container"]
async fn test_customer_report_calls_the_integer_function() {
    let db = bring_up_seeded_postgres().await.unwrap();

    let table = db.repository().customer_report(1).await.unwrap();

    assert_eq!(table.columns(), ["productname", "totalspent", "lastpurchase"]);
    assert_eq!(
        table.rows(),
        [
            vec![
                text("Cheese"),
                Value::Decimal(dec!(58.00)),
                Value::Timestamp(timestamp(2018, 1, 12, 11, 30)),
            ],
            vec![
                text("Milk"),
                Value::Decimal(dec!(25.00)),
                Value::Timestamp(timestamp(2018, 1, 5, 10, 0)),
            ],
            vec![
                text("Bread"),
                Value::Decimal(dec!(15.00)),
                Value::Timestamp(timestamp(2018, 2, 20, 8, 0)),
            ],
        ]
    );
}

#[tokio::test]
#[ignore = "starts a PostgreSQL container"]
async fn test_customer_without_sales_keeps_the_columns() {
    let db = bring_up_seeded_postgres().await.unwrap();

    let table = db.repository().customer_report(3).await.unwrap();

    assert!(table.is_empty());
    assert_eq!(table.columns(), ["productname", "totalspent", "lastpurchase"]);
    assert_ne!(table, Table::empty());
}

#[tokio::test]
#[ignore = "starts a PostgreSQL container"]
async fn test_sql_failures_are_errors_unless_lenient() {
    let db = bring_up_seeded_postgres().await.unwrap();
    sqlx::raw_sql("DROP FUNCTION sp_reporte_cliente(integer)")
        .execute(db.pool().await)
        .await
        .unwrap();

    let err = db.repository().customer_report(1).await.unwrap_err();
    assert!(matches!(err, DbError::Query(sqlx::Error::Database(_))));

    let lenient = LenientRepository::new(db.repository());
    assert_eq!(lenient.customer_report(1).await, Table::empty());
}

#[tokio::test]
#[ignore = "starts a PostgreSQL container"]
async fn test_entities_map_from_rows() {
    let db = bring_up_seeded_postgres().await.unwrap();
    let pool = db.pool().await;

    let customers: Vec<Customer> =
        sqlx::query_as("SELECT * FROM customers WHERE CustomerID IN (1, 2) ORDER BY CustomerID")
            .fetch_all(pool)
            .await
            .unwrap();
    assert_eq!(customers[0].full_name(), "Juan A. Perez");
    assert_eq!(customers[0].address.as_deref(), Some("12 Main St"));
    assert_eq!(customers[1].full_name(), "Ana Gomez");
    assert_eq!(customers[1].middle_initial, None);

    let yogurt: Product = sqlx::query_as("SELECT * FROM products WHERE ProductID = $1")
        .bind(3_i32)
        .fetch_one(pool)
        .await
        .unwrap();
    assert_eq!(yogurt.product_name, "Yogurt");
    assert_eq!(yogurt.price, dec!(1.10));
    assert_eq!(yogurt.category_id, 1);
    assert_eq!(yogurt.is_allergic.as_deref(), Some("FALSE"));
    assert_eq!(yogurt.modify_date, None);
    assert_eq!(yogurt.vitality_days, None);

    let sales: Vec<Sale> = sqlx::query_as("SELECT * FROM sales WHERE SalesID IN (3, 6) ORDER BY SalesID")
        .fetch_all(pool)
        .await
        .unwrap();
    assert_eq!(sales[0].discount, dec!(0.10));
    assert_eq!(sales[0].total_price, dec!(5.94));
    assert_eq!(sales[0].sales_date, Some(timestamp(2018, 2, 3, 9, 15)));
    assert_eq!(sales[0].transaction_number, "T0003");
    assert_eq!(sales[1].sales_date, None);
}
