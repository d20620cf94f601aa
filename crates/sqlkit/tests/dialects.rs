//! Dialect matrix: the same model rendered under each supported product.

use sqlkit::{Catalog, Compiler, ConditionGroup, Dialect, OrderSpec, QueryError};

fn catalog() -> Catalog {
    Catalog::builder("Article", "T_ARTICLE")
        .unwrap()
        .primary_key("id", "ID", "Id")
        .unwrap()
        .column("title", "TITLE", "Title")
        .unwrap()
        .column("author", "AUTHOR", "Author")
        .unwrap()
        .build()
}

fn title_match(dialect: Dialect) -> String {
    let mut cond = ConditionGroup::new();
    cond.like("title", "rust").unwrap();
    Compiler::new(catalog(), dialect)
        .where_clause(&cond)
        .unwrap()
        .sql()
}

#[test]
fn wildcard_concatenation_per_dialect() {
    assert_eq!(title_match(Dialect::Oracle), "WHERE TITLE LIKE '%'||?||'%'");
    assert_eq!(title_match(Dialect::Db2), "WHERE TITLE LIKE '%'||?||'%'");
    assert_eq!(
        title_match(Dialect::PostgreSql),
        "WHERE TITLE LIKE '%'||?||'%'"
    );
    assert_eq!(
        title_match(Dialect::MySql),
        "WHERE TITLE LIKE CONCAT('%',?,'%')"
    );
    assert_eq!(title_match(Dialect::H2), "WHERE TITLE LIKE CONCAT('%',?,'%')");
    assert_eq!(title_match(Dialect::SqlServer), "WHERE TITLE LIKE '%'+?+'%'");
}

fn paged(dialect: Dialect, start: u64, rows: u64) -> String {
    Compiler::new(catalog(), dialect)
        .select_statement(&ConditionGroup::new(), &[], Some((start, rows)))
        .unwrap()
        .sql()
}

#[test]
fn mysql_paging() {
    assert_eq!(
        paged(Dialect::MySql, 0, 10),
        "SELECT ID, TITLE, AUTHOR FROM T_ARTICLE LIMIT 10"
    );
    assert_eq!(
        paged(Dialect::MySql, 20, 10),
        "SELECT ID, TITLE, AUTHOR FROM T_ARTICLE LIMIT 20,10"
    );
}

#[test]
fn h2_paging_matches_mysql() {
    assert_eq!(
        paged(Dialect::H2, 20, 10),
        "SELECT ID, TITLE, AUTHOR FROM T_ARTICLE LIMIT 20,10"
    );
}

#[test]
fn postgres_paging() {
    assert_eq!(
        paged(Dialect::PostgreSql, 0, 10),
        "SELECT ID, TITLE, AUTHOR FROM T_ARTICLE LIMIT 10"
    );
    assert_eq!(
        paged(Dialect::PostgreSql, 20, 10),
        "SELECT ID, TITLE, AUTHOR FROM T_ARTICLE LIMIT 10 OFFSET 20"
    );
}

#[test]
fn oracle_paging_wraps_once_without_offset() {
    assert_eq!(
        paged(Dialect::Oracle, 0, 10),
        "SELECT * FROM ( SELECT ID, TITLE, AUTHOR FROM T_ARTICLE ) WHERE ROWNUM <= 10"
    );
}

#[test]
fn oracle_paging_wraps_twice_with_offset() {
    assert_eq!(
        paged(Dialect::Oracle, 20, 10),
        "SELECT * FROM ( SELECT ROW_.*, ROWNUM R_N FROM ( \
         SELECT ID, TITLE, AUTHOR FROM T_ARTICLE \
         ) ROW_ WHERE ROWNUM <= 30 ) WHERE R_N > 20"
    );
}

#[test]
fn db2_paging() {
    assert_eq!(
        paged(Dialect::Db2, 0, 10),
        "SELECT ID, TITLE, AUTHOR FROM T_ARTICLE FETCH FIRST 10 ROWS ONLY"
    );
    assert_eq!(
        paged(Dialect::Db2, 20, 10),
        "SELECT * FROM ( SELECT ROW_.*, ROWNUMBER() OVER() AS R_N FROM ( \
         SELECT ID, TITLE, AUTHOR FROM T_ARTICLE \
         ) AS ROW_ ) WHERE R_N > 20 AND R_N <= 30"
    );
}

#[test]
fn sqlserver_paging_fails_loudly() {
    let result = Compiler::new(catalog(), Dialect::SqlServer).select_statement(
        &ConditionGroup::new(),
        &[],
        Some((0, 10)),
    );
    assert!(matches!(result, Err(QueryError::UnsupportedDialect(_))));
}

#[test]
fn locale_ordering_only_converts_where_needed() {
    let orders = [OrderSpec::asc("author#locale"), OrderSpec::desc("id")];
    let mysql = Compiler::new(catalog(), Dialect::MySql)
        .order_by_clause(&orders)
        .unwrap();
    assert_eq!(
        mysql.sql(),
        "ORDER BY CONVERT(AUTHOR USING GBK) ASC, ID DESC"
    );

    let oracle = Compiler::new(catalog(), Dialect::Oracle)
        .order_by_clause(&orders)
        .unwrap();
    assert_eq!(oracle.sql(), "ORDER BY AUTHOR ASC, ID DESC");
}

#[test]
fn unknown_dialect_name_is_rejected() {
    assert!(matches!(
        Dialect::from_name("sybase"),
        Err(QueryError::UnsupportedDialect(_))
    ));
}
