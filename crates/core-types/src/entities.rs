//! Row mirrors for the tables of the sales database.
//!
//! PostgreSQL folds the unquoted `CamelCase` column names of the schema to
//! lowercase, so every field carries an explicit `sqlx` rename.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use crate::person::PersonName;

/// Represents a row from the `categories` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    #[sqlx(rename = "categoryid")]
    pub category_id: i32,
    #[sqlx(rename = "categoryname")]
    pub category_name: String,
}

/// Represents a row from the `countries` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Country {
    #[sqlx(rename = "countryid")]
    pub country_id: i32,
    #[sqlx(rename = "countryname")]
    pub country_name: String,
    #[sqlx(rename = "countrycode")]
    pub country_code: String,
}

/// Represents a row from the `cities` table. Every city belongs to a country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct City {
    #[sqlx(rename = "cityid")]
    pub city_id: i32,
    #[sqlx(rename = "cityname")]
    pub city_name: String,
    pub zipcode: String,
    #[sqlx(rename = "countryid")]
    pub country_id: i32,
}

/// Represents a row from the `customers` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Customer {
    #[sqlx(rename = "customerid")]
    pub customer_id: i32,
    #[sqlx(rename = "firstname")]
    pub first_name: String,
    #[sqlx(rename = "middleinitial")]
    pub middle_initial: Option<String>,
    #[sqlx(rename = "lastname")]
    pub last_name: String,
    pub address: Option<String>,
    #[sqlx(rename = "cityid")]
    pub city_id: i32,
    #[sqlx(rename = "countryid")]
    pub country_id: i32,
}

/// Represents a row from the `employees` table (the salespeople).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Employee {
    #[sqlx(rename = "employeeid")]
    pub employee_id: i32,
    #[sqlx(rename = "firstname")]
    pub first_name: String,
    #[sqlx(rename = "middleinitial")]
    pub middle_initial: Option<String>,
    #[sqlx(rename = "lastname")]
    pub last_name: String,
    #[sqlx(rename = "cityid")]
    pub city_id: i32,
    #[sqlx(rename = "hiredate")]
    pub hire_date: NaiveDate,
    #[sqlx(rename = "birthdate")]
    pub birth_date: NaiveDate,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    #[sqlx(rename = "productid")]
    pub product_id: i32,
    #[sqlx(rename = "productname")]
    pub product_name: String,
    pub price: Decimal,
    #[sqlx(rename = "categoryid")]
    pub category_id: i32,
    #[sqlx(rename = "modifydate")]
    pub modify_date: Option<NaiveDate>,
    pub class: Option<String>,
    pub resistant: Option<String>,
    #[sqlx(rename = "isallergic")]
    pub is_allergic: Option<String>,
    #[sqlx(rename = "vitalitydays")]
    pub vitality_days: Option<i32>,
}

/// Represents a row from the `sales` table: one product sold to one
/// customer by one salesperson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Sale {
    #[sqlx(rename = "salesid")]
    pub sales_id: i32,
    #[sqlx(rename = "salespersonid")]
    pub sales_person_id: i32,
    #[sqlx(rename = "customerid")]
    pub customer_id: i32,
    #[sqlx(rename = "productid")]
    pub product_id: i32,
    pub quantity: i32,
    pub discount: Decimal,
    #[sqlx(rename = "totalprice")]
    pub total_price: Decimal,
    #[sqlx(rename = "salesdate")]
    pub sales_date: Option<NaiveDateTime>,
    #[sqlx(rename = "transactionnumber")]
    pub transaction_number: String,
}

impl PersonName for Customer {
    fn first_name(&self) -> &str {
        &self.first_name
    }

    fn middle_initial(&self) -> Option<&str> {
        self.middle_initial.as_deref()
    }

    fn last_name(&self) -> &str {
        &self.last_name
    }
}

impl PersonName for Employee {
    fn first_name(&self) -> &str {
        &self.first_name
    }

    fn middle_initial(&self) -> Option<&str> {
        self.middle_initial.as_deref()
    }

    fn last_name(&self) -> &str {
        &self.last_name
    }
}

// --- Display Implementations ---

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Category(ID={}, Name='{}')", self.category_id, self.category_name)
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Country(ID={}, Name='{}')", self.country_id, self.country_name)
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "City(ID={}, Name='{}')", self.city_id, self.city_name)
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Customer(ID={}, Name='{}')", self.customer_id, self.full_name())
    }
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Employee(ID={}, Name='{}')", self.employee_id, self.full_name())
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Product(ID={}, Name='{}', Price={})",
            self.product_id, self.product_name, self.price
        )
    }
}

impl fmt::Display for Sale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sale(ID={}, Transaction='{}', Total=${})",
            self.sales_id, self.transaction_number, self.total_price
        )
    }
}
