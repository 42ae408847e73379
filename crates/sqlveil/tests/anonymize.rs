//! Anonymization and de-anonymization, end to end.

use sqlveil::{compact_qualified, Anonymizer, Error, MappingState, TokenCategory};

fn anonymize_canonical(anonymizer: &mut Anonymizer, sql: &str) -> String {
    let canonical = anonymizer.canonicalize(sql);
    anonymizer.anonymize(&canonical).unwrap().text
}

mod scenarios {
    use super::*;

    #[test]
    fn test_simple_select() {
        let mut anonymizer = Anonymizer::new();
        let out = anonymize_canonical(
            &mut anonymizer,
            "SELECT name, salary FROM employees WHERE salary > 50000;",
        );

        assert_eq!(
            out,
            "SELECT identifier_1 , identifier_2 FROM table_1 WHERE identifier_2 > literal_1 ;"
        );
        assert_eq!(anonymizer.state().counter(TokenCategory::Identifier).unwrap(), 2);
        assert_eq!(anonymizer.state().counter(TokenCategory::Table).unwrap(), 1);
        assert_eq!(anonymizer.state().counter(TokenCategory::Literal).unwrap(), 1);
    }

    #[test]
    fn test_insert_into_form() {
        let mut anonymizer = Anonymizer::new();
        let out = anonymize_canonical(
            &mut anonymizer,
            "INSERT INTO orders (id, amount) VALUES (1, 100);",
        );

        // The insert target is an identifier (it follows INTO, not FROM or
        // JOIN), and the VALUES row literals survive verbatim.
        assert_eq!(
            out,
            "INSERT INTO identifier_1 ( identifier_2 , identifier_3 ) VALUES ( 1 , 100 ) ;"
        );
        assert_eq!(anonymizer.state().counter(TokenCategory::Literal).unwrap(), 0);
        assert_eq!(anonymizer.state().counter(TokenCategory::Table).unwrap(), 0);
    }

    #[test]
    fn test_rerunning_is_byte_identical() {
        let mut anonymizer = Anonymizer::new();
        let sql = "SELECT name, age FROM users WHERE id = 1";

        let first = anonymize_canonical(&mut anonymizer, sql);
        let second = anonymize_canonical(&mut anonymizer, sql);

        assert_eq!(first, second);
    }

    #[test]
    fn test_alias_passthrough() {
        let mut anonymizer = Anonymizer::new();
        let out = anonymize_canonical(
            &mut anonymizer,
            "SELECT c.name FROM customers c WHERE c.id = 1",
        );

        assert_eq!(
            out,
            "SELECT c . identifier_1 FROM table_1 c WHERE c . identifier_2 = literal_1"
        );
        assert_eq!(
            compact_qualified(&out),
            "SELECT c.identifier_1 FROM table_1 c WHERE c.identifier_2 = literal_1"
        );
    }
}

mod mappings {
    use super::*;

    #[test]
    fn test_repeated_values_share_placeholders() {
        let mut anonymizer = Anonymizer::new();
        let out = anonymize_canonical(
            &mut anonymizer,
            "SELECT date, amount FROM orders WHERE amount >= 100 AND date = 5;",
        );

        assert_eq!(
            out,
            "SELECT identifier_1 , identifier_2 FROM table_1 WHERE identifier_2 >= literal_1 AND identifier_1 = literal_2 ;"
        );
        assert_eq!(anonymizer.state().counter(TokenCategory::Identifier).unwrap(), 2);
        assert_eq!(anonymizer.state().counter(TokenCategory::Literal).unwrap(), 2);
    }

    #[test]
    fn test_in_list_literals_and_function_calls() {
        // Fed straight to the anonymizer without canonicalization: keyword
        // and function casing passes through exactly as written.
        let mut anonymizer = Anonymizer::new();
        let out = anonymizer
            .anonymize(
                "SELECT id, name FROM employees WHERE dept IN (30,60,90) AND year(hire_date) = 2025;",
            )
            .unwrap();

        assert_eq!(
            out.text,
            "SELECT identifier_1 , identifier_2 FROM table_1 WHERE identifier_3 IN ( literal_1 , literal_2 , literal_3 ) AND year ( identifier_4 ) = literal_4 ;"
        );
        assert_eq!(anonymizer.state().counter(TokenCategory::Identifier).unwrap(), 4);
        assert_eq!(anonymizer.state().counter(TokenCategory::Literal).unwrap(), 4);
    }

    #[test]
    fn test_new_mappings_delta_drives_save_on_change() {
        let mut anonymizer = Anonymizer::new();

        let first = anonymizer.anonymize("SELECT a FROM t").unwrap();
        assert_eq!(first.new_mappings, 2);

        let second = anonymizer.anonymize("SELECT a FROM t").unwrap();
        assert_eq!(second.new_mappings, 0);
    }

    #[test]
    fn test_keywords_functions_symbols_aliases_preserved() {
        let mut anonymizer = Anonymizer::new();
        let canonical = anonymizer
            .canonicalize("SELECT COUNT(*) AS total_orders FROM orders o WHERE o.date >= '2023-01-01';");
        let out = anonymizer.anonymize(&canonical).unwrap().text;

        for preserved in ["SELECT", "COUNT", "(", "*", ")", "AS", "total_orders", "FROM", "o", ">=", ";"] {
            assert!(
                out.split(' ').any(|tok| tok == preserved),
                "{preserved:?} missing from {out:?}"
            );
        }
        assert!(!out.split(' ').any(|tok| tok == "orders"));
        assert!(!out.contains("'2023-01-01'"));
    }

    #[test]
    fn test_prefix_contract_violation_is_an_error() {
        let mut state = MappingState::new();
        let err = state.assign(TokenCategory::Keyword, "SELECT").unwrap_err();
        assert!(matches!(err, Error::UnsupportedCategory(TokenCategory::Keyword)));
    }
}

mod round_trips {
    use super::*;

    #[test]
    fn test_de_anonymize_restores_canonical_text() {
        let queries = [
            "SELECT name, age FROM users WHERE id = 1",
            "SELECT u.name, p.title FROM users u JOIN posts p ON u.id = p.user_id",
            "SELECT * FROM products WHERE price > 100.50 AND category = 'electronics'",
            "SELECT COUNT(*), AVG(salary) FROM employees WHERE department = 'IT'",
            "INSERT INTO orders (id, amount) VALUES (1, 100);",
        ];
        for query in queries {
            let mut anonymizer = Anonymizer::new();
            let canonical = anonymizer.canonicalize(query);
            let anonymized = anonymizer.anonymize(&canonical).unwrap();

            assert_eq!(
                anonymizer.de_anonymize(&anonymized.text),
                canonical,
                "query: {query:?}"
            );
        }
    }

    #[test]
    fn test_unknown_placeholders_pass_through() {
        let anonymizer = Anonymizer::new();
        let text = "SELECT identifier_9 FROM table_7 WHERE x = literal_3";

        assert_eq!(anonymizer.de_anonymize(text), text);
    }

    #[test]
    fn test_de_anonymize_ignores_fresh_lexical_category() {
        // On re-tokenization the placeholders lex as plain identifiers and
        // table_1 even lands in Table position; the reverse lookup must win
        // regardless.
        let mut anonymizer = Anonymizer::new();
        let canonical = anonymizer.canonicalize("SELECT name FROM users WHERE id = 1");
        let anonymized = anonymizer.anonymize(&canonical).unwrap();

        let restored = anonymizer.de_anonymize(&anonymized.text);
        assert!(restored.contains("users"));
        assert!(restored.contains("name"));
        assert!(restored.split(' ').any(|tok| tok == "1"));
    }
}

mod complex_queries {
    use super::*;

    #[test]
    fn test_correlated_subqueries_and_alias_stability() {
        let query = "SELECT *, (SELECT COUNT(*) FROM orders o2 WHERE o2.customer_id = c.id) as order_count, (SELECT MAX(total_amount) FROM orders o3 WHERE o3.customer_id = c.id) as max_order FROM customers c WHERE c.status = 'active' AND c.created_date > '2020-01-01' AND c.id IN (SELECT DISTINCT customer_id FROM orders WHERE order_date >= '2023-01-01') AND EXISTS (SELECT 'X' FROM customer_preferences cp WHERE cp.customer_id = c.id AND cp.email_marketing = 'yes') ORDER BY c.last_name, c.first_name LIMIT 1000;";
        let expected = "SELECT * , ( SELECT COUNT ( * ) FROM table_1 o2 WHERE o2.identifier_1 = c.identifier_2 ) AS order_count , ( SELECT MAX ( identifier_3 ) FROM table_1 o3 WHERE o3.identifier_1 = c.identifier_2 ) AS max_order FROM table_2 c WHERE c.identifier_4 = literal_1 AND c.identifier_5 > literal_2 AND c.identifier_2 IN ( SELECT DISTINCT identifier_1 FROM table_1 WHERE identifier_6 >= literal_3 ) AND EXISTS ( SELECT literal_4 FROM table_3 cp WHERE cp.identifier_1 = c.identifier_2 AND cp.identifier_7 = literal_5 ) ORDER BY c.identifier_8 , c.identifier_9 LIMIT literal_6 ;";

        let mut anonymizer = Anonymizer::new();
        let anonymized = anonymize_canonical(&mut anonymizer, query);

        assert_eq!(compact_qualified(&anonymized), expected);
    }

    #[test]
    fn test_multi_table_join() {
        let query = "SELECT c.customer_name, o.order_date FROM customers c JOIN orders o ON c.id = o.customer_id WHERE c.status = 'active'";
        let mut anonymizer = Anonymizer::new();
        let out = compact_qualified(&anonymize_canonical(&mut anonymizer, query));

        assert_eq!(
            out,
            "SELECT c.identifier_1 , o.identifier_2 FROM table_1 c JOIN table_2 o ON c.identifier_3 = o.identifier_4 WHERE c.identifier_5 = literal_1"
        );
    }
}
