//! SQL text for the analytical queries.
//!
//! Column names in the schema are unquoted `CamelCase`, which PostgreSQL
//! folds to lowercase, so result columns come back as e.g. `countryname`.
//! Caller-supplied values are always `$n` placeholders.

/// Transactions and revenue per customer country, highest revenue first.
pub const SALES_SUMMARY_BY_COUNTRY: &str = r#"
    SELECT
        co.CountryName,
        COUNT(s.SalesID) AS TotalTransactions,
        SUM(s.TotalPrice) AS TotalRevenue
    FROM sales s
    JOIN customers c ON s.CustomerID = c.CustomerID
    JOIN cities ci ON c.CityID = ci.CityID
    JOIN countries co ON ci.CountryID = co.CountryID
    GROUP BY co.CountryName
    ORDER BY TotalRevenue DESC
"#;

/// The best-selling products of every category. `$1` is the per-category limit.
pub const TOP_PRODUCTS_PER_CATEGORY: &str = r#"
    WITH ProductSales AS (
        SELECT
            s.ProductID,
            SUM(s.Quantity) AS TotalQuantitySold
        FROM sales s
        GROUP BY s.ProductID
    ),
    RankedProducts AS (
        SELECT
            c.CategoryName,
            p.ProductName,
            ps.TotalQuantitySold,
            ROW_NUMBER() OVER (PARTITION BY c.CategoryID ORDER BY ps.TotalQuantitySold DESC) AS Rank
        FROM products p
        JOIN categories c ON p.CategoryID = c.CategoryID
        JOIN ProductSales ps ON p.ProductID = ps.ProductID
    )
    SELECT
        rp.CategoryName,
        rp.ProductName,
        rp.TotalQuantitySold
    FROM RankedProducts rp
    WHERE rp.Rank <= $1
    ORDER BY rp.CategoryName, rp.TotalQuantitySold DESC
"#;

/// Revenue per month with the previous month's revenue and the growth
/// percentage. The first month's previous revenue is 0, and growth over a
/// zero month is NULL rather than a division error.
pub const MONTHLY_SALES_GROWTH: &str = r#"
    WITH MonthlySales AS (
        SELECT
            DATE_TRUNC('month', SalesDate) AS SaleMonth,
            SUM(TotalPrice) AS MonthlyRevenue
        FROM v_ventas_detalladas
        WHERE SalesDate IS NOT NULL
        GROUP BY SaleMonth
    )
    SELECT
        to_char(ms.SaleMonth, 'YYYY-MM') AS SaleMonth,
        ms.MonthlyRevenue,
        LAG(ms.MonthlyRevenue, 1, 0) OVER (ORDER BY ms.SaleMonth) AS PreviousMonthRevenue,
        (ms.MonthlyRevenue - LAG(ms.MonthlyRevenue, 1, 0) OVER (ORDER BY ms.SaleMonth))
            / NULLIF(LAG(ms.MonthlyRevenue, 1, 0) OVER (ORDER BY ms.SaleMonth), 0) * 100 AS GrowthPercentage
    FROM MonthlySales ms
    ORDER BY ms.SaleMonth
"#;

/// Activity report for one customer from the `sp_reporte_cliente` function.
pub const CUSTOMER_REPORT: &str = "SELECT * FROM sp_reporte_cliente($1)";
