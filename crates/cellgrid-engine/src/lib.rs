//! cellgrid_engine - Formula interpreter for the cell grid.

pub mod engine;

#[cfg(test)]
mod tests {
    use crate::engine::*;
    use std::collections::HashMap;

    fn sheet(cells: &[(&str, &str)]) -> HashMap<CellRef, String> {
        cells
            .iter()
            .map(|(name, raw)| (CellRef::from_str(name).unwrap(), raw.to_string()))
            .collect()
    }

    fn display(cells: &HashMap<CellRef, String>, name: &str) -> String {
        let extent = SheetExtent::default();
        let cell = CellRef::from_str(name).unwrap();
        Evaluator::new(cells, &extent).display_cell(&cell)
    }

    fn value(cells: &HashMap<CellRef, String>, name: &str) -> EvalResult {
        let extent = SheetExtent::default();
        Evaluator::new(cells, &extent).evaluate_cell(&CellRef::from_str(name).unwrap())
    }

    #[test]
    fn test_simple_reference_arithmetic() {
        let cells = sheet(&[("A1", "2"), ("A2", "3"), ("A3", "=A1+A2")]);
        assert_eq!(value(&cells, "A3"), Ok(Scalar::Number(5.0)));
        assert_eq!(display(&cells, "A3"), "5");
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let cells = sheet(&[("A1", "=A1")]);
        assert_eq!(value(&cells, "A1"), Err(EvalError::Cycle));
        assert_eq!(display(&cells, "A1"), "#CYCLE");
    }

    #[test]
    fn test_mutual_reference_is_cycle() {
        let cells = sheet(&[("A1", "=A2"), ("A2", "=A1")]);
        assert_eq!(value(&cells, "A1"), Err(EvalError::Cycle));
        assert_eq!(value(&cells, "A2"), Err(EvalError::Cycle));
    }

    #[test]
    fn test_range_aggregates() {
        let cells = sheet(&[
            ("A1", "1"),
            ("A2", "2"),
            ("A3", "3"),
            ("A4", "=SUM(A1:A3)"),
            ("A5", "=AVG(A1:A3)"),
            ("A6", "=MIN(A1:A3)"),
            ("A7", "=MAX(A3:A1)"),
            ("A8", "=PRODUCT(A1:A3)"),
            ("A9", "=COUNT(A1:A3)"),
        ]);
        assert_eq!(display(&cells, "A4"), "6");
        assert_eq!(display(&cells, "A5"), "2");
        assert_eq!(display(&cells, "A6"), "1");
        assert_eq!(display(&cells, "A7"), "3");
        assert_eq!(display(&cells, "A8"), "6");
        assert_eq!(display(&cells, "A9"), "3");
    }

    #[test]
    fn test_nested_functions_innermost_first() {
        let cells = sheet(&[("A1", "1"), ("A2", "2"), ("A3", "3"), ("A4", "=SUM(MAX(A1,A2),A3)")]);
        assert_eq!(value(&cells, "A4"), Ok(Scalar::Number(5.0)));
    }

    #[test]
    fn test_deeply_nested_functions() {
        let cells = sheet(&[
            ("A1", "1"),
            ("A2", "4"),
            ("B1", "=sum(min(A1:A2), max(A1, product(A2, 2)), avg(2, 4)) * 2"),
        ]);
        assert_eq!(value(&cells, "B1"), Ok(Scalar::Number(24.0)));
    }

    #[test]
    fn test_if_condition() {
        let cells = sheet(&[
            ("A1", "10"),
            ("B1", "=IF(A1>5,1,0)"),
            ("B2", "=IF(A1>50,1,0)"),
            ("B3", "=IF(A1=10,\"ten\",\"other\")"),
            ("B4", "=IF(A1<>10,'no','yes')"),
            ("B5", "=IF(A1>=10, A1, 0) + 1"),
        ]);
        assert_eq!(display(&cells, "B1"), "1");
        assert_eq!(display(&cells, "B2"), "0");
        assert_eq!(display(&cells, "B3"), "ten");
        assert_eq!(display(&cells, "B4"), "yes");
        assert_eq!(display(&cells, "B5"), "11");
    }

    #[test]
    fn test_if_edge_cases() {
        let cells = sheet(&[
            ("A1", "label"),
            ("A2", "7"),
            ("B1", "=IF(1)"),
            ("B2", "=IF(0, 5)"),
            ("B3", "=IF(1, A1, 0)"),
            ("B4", "=IF(1, A2, 0)"),
            ("B5", "=IF(1, done, 0)"),
            ("B6", "=IF(hello > 1, 1, 2)"),
            ("B7", "=IF(SUM(A2, 1) = 8, 1, 2)"),
            ("B8", "=IF(1, 'x', 0) + 1"),
        ]);
        assert_eq!(display(&cells, "B1"), "0");
        assert_eq!(display(&cells, "B2"), "0");
        assert_eq!(display(&cells, "B3"), "label");
        assert_eq!(display(&cells, "B4"), "7");
        assert_eq!(display(&cells, "B5"), "done");
        assert_eq!(display(&cells, "B6"), "2");
        assert_eq!(display(&cells, "B7"), "1");
        assert_eq!(display(&cells, "B8"), "#ERR");
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let cells = sheet(&[("A1", "4"), ("A2", "=SUM(A1, 2) * A1"), ("A3", "=A3")]);
        assert_eq!(value(&cells, "A2"), value(&cells, "A2"));
        assert_eq!(value(&cells, "A3"), value(&cells, "A3"));
    }

    #[test]
    fn test_out_of_range_reference_is_zero() {
        let cells = sheet(&[("A1", "=Z999"), ("A2", "=Z999+1"), ("A3", "=SUM(Z1:Z3, 2)")]);
        assert_eq!(value(&cells, "A1"), Ok(Scalar::Number(0.0)));
        assert_eq!(value(&cells, "A2"), Ok(Scalar::Number(1.0)));
        assert_eq!(value(&cells, "A3"), Ok(Scalar::Number(2.0)));
    }

    #[test]
    fn test_malformed_expression_is_invalid() {
        let cells = sheet(&[("A1", "=A1+"), ("A2", "=1 2"), ("A3", "=FOO(1)")]);
        assert_eq!(display(&cells, "A1"), "#ERR");
        assert_eq!(display(&cells, "A2"), "#ERR");
        assert_eq!(display(&cells, "A3"), "#ERR");
    }

    #[test]
    fn test_error_propagates_one_hop_into_arithmetic() {
        let cells = sheet(&[("A1", "=A1"), ("A2", "=A1+1")]);
        assert_eq!(value(&cells, "A1"), Err(EvalError::Cycle));
        assert_eq!(value(&cells, "A2"), Err(EvalError::Invalid));
    }

    #[test]
    fn test_aggregates_coerce_bad_arguments_to_zero() {
        let cells = sheet(&[
            ("A1", "text"),
            ("A2", "=1+"),
            ("A3", "5"),
            ("B1", "=SUM(A1:A3)"),
            ("B2", "=SUM(abc, 1)"),
            ("B3", "=MIN()"),
            ("B4", "=MAX()"),
            ("B5", "=SUM(A3 * 2, 1)"),
        ]);
        assert_eq!(value(&cells, "B1"), Ok(Scalar::Number(5.0)));
        assert_eq!(value(&cells, "B2"), Ok(Scalar::Number(1.0)));
        assert_eq!(value(&cells, "B3"), Ok(Scalar::Number(0.0)));
        assert_eq!(value(&cells, "B4"), Ok(Scalar::Number(0.0)));
        assert_eq!(value(&cells, "B5"), Ok(Scalar::Number(11.0)));
    }

    #[test]
    fn test_range_including_own_cell_is_cycle() {
        let cells = sheet(&[("A1", "1"), ("A2", "2"), ("A3", "=SUM(A1:A3)")]);
        assert_eq!(value(&cells, "A3"), Err(EvalError::Cycle));
    }

    #[test]
    fn test_literals_display_verbatim() {
        let cells = sheet(&[("A1", " 42 "), ("A2", "hello world")]);
        assert_eq!(display(&cells, "A1"), " 42 ");
        assert_eq!(display(&cells, "A2"), "hello world");
        assert_eq!(display(&cells, "A3"), "");
    }

    #[test]
    fn test_display_for_uses_row_and_label() {
        let cells = sheet(&[("C2", "=2*3.5")]);
        let extent = SheetExtent::default();
        let evaluator = Evaluator::new(&cells, &extent);
        assert_eq!(evaluator.display_for(2, "C"), "7");
        assert_eq!(evaluator.display_for(2, "c"), "7");
        assert_eq!(evaluator.display_for(0, "C"), "");
    }

    #[test]
    fn test_lowercase_references() {
        let cells = sheet(&[("A1", "3"), ("B1", "=a1*2"), ("B2", "=sum(a1:b1)")]);
        assert_eq!(value(&cells, "B1"), Ok(Scalar::Number(6.0)));
        assert_eq!(value(&cells, "B2"), Ok(Scalar::Number(9.0)));
    }

    #[test]
    fn test_grid_store_works_with_evaluator() {
        let grid: Grid = std::sync::Arc::new(dashmap::DashMap::new());
        grid.insert(CellRef::from_str("A1").unwrap(), "21".into());
        grid.insert(CellRef::from_str("A2").unwrap(), "=A1*2".into());
        let extent = SheetExtent::default();
        let evaluator = Evaluator::new(&grid, &extent);
        assert_eq!(evaluator.display_for(2, "A"), "42");
    }

    #[test]
    fn test_malformed_aggregate_arguments_count_as_zero() {
        let cells = sheet(&[
            ("A1", "=SUM(1.2.3, 4)"),
            ("A2", "=SUM(1 2, 4)"),
            ("A3", "=MAX($5, 4)"),
            ("A4", "=SUM(A9 + , 4)"),
            ("A5", "=SUM(1e3, 4)"),
            ("A6", "=COUNT(1.2.3, 4)"),
            ("A7", "=SUM(FOO(1), 4)"),
        ]);
        assert_eq!(display(&cells, "A1"), "4");
        assert_eq!(display(&cells, "A2"), "4");
        assert_eq!(display(&cells, "A3"), "4");
        assert_eq!(display(&cells, "A4"), "4");
        assert_eq!(display(&cells, "A5"), "1004");
        assert_eq!(display(&cells, "A6"), "2");
        assert_eq!(display(&cells, "A7"), "4");
    }

    #[test]
    fn test_malformed_if_arguments() {
        let cells = sheet(&[
            ("A1", "=IF(1, 1 2, 0)"),
            ("A2", "=IF(0, 1, $x)"),
            ("A3", "=IF(1 2, 'yes', 'no')"),
            ("A4", "=IF(1, 1 2, 0) + 1"),
        ]);
        assert_eq!(display(&cells, "A1"), "1 2");
        assert_eq!(display(&cells, "A2"), "$x");
        assert_eq!(display(&cells, "A3"), "no");
        assert_eq!(display(&cells, "A4"), "#ERR");
    }

    /// Run `f` on a thread with the stack of a default main thread.
    fn with_main_stack<F: FnOnce() + Send + 'static>(f: F) {
        std::thread::Builder::new()
            .stack_size(8 << 20)
            .spawn(f)
            .unwrap()
            .join()
            .unwrap();
    }

    #[test]
    fn test_deeply_nested_chain_is_invalid() {
        with_main_stack(|| {
            let mut cells = HashMap::new();
            for row in 1..250 {
                let body = format!("{}A{}{}", "SUM(".repeat(60), row + 1, ")".repeat(60));
                cells.insert(CellRef::new(0, row - 1), format!("={}", body));
            }
            cells.insert(CellRef::new(0, 249), "1".to_string());
            let extent = SheetExtent::with_size(1, 300);
            let evaluator = Evaluator::new(&cells, &extent);

            assert_eq!(evaluator.display_cell(&CellRef::new(0, 0)), "#ERR");
            assert_eq!(evaluator.evaluate_cell(&CellRef::new(0, 0)), Err(EvalError::Invalid));
            // A shallow tail of the same chain still evaluates afterwards.
            assert_eq!(evaluator.display_cell(&CellRef::new(0, 244)), "1");
        });
    }

    #[test]
    fn test_long_chain_stops_at_recursion_limit() {
        with_main_stack(|| {
            let mut cells = HashMap::new();
            for row in 1..1050 {
                cells.insert(CellRef::new(0, row - 1), format!("=A{}", row + 1));
            }
            cells.insert(CellRef::new(0, 1049), "7".to_string());
            let extent = SheetExtent::with_size(1, 1100);
            let evaluator = Evaluator::new(&cells, &extent).with_max_depth(100_000);

            assert_eq!(evaluator.evaluate_cell(&CellRef::new(0, 0)), Err(EvalError::Invalid));
            assert_eq!(evaluator.evaluate_cell(&CellRef::new(0, 99)), Ok(Scalar::Number(7.0)));
        });
    }
}
