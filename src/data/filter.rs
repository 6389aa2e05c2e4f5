use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, ChemistryTable};

// ---------------------------------------------------------------------------
// Label filters: which sites / seasons are shown in the score plot
// ---------------------------------------------------------------------------

/// Per-column selection: column_name → selected labels.
/// A column absent from the map is unconstrained.
pub type FilterState = BTreeMap<String, BTreeSet<CellValue>>;

/// Start with every label of the given columns selected.
pub fn init_filter_state(table: &ChemistryTable, columns: &[&str]) -> FilterState {
    columns
        .iter()
        .filter_map(|col| {
            table
                .unique_values
                .get(*col)
                .map(|vals| (col.to_string(), vals.clone()))
        })
        .collect()
}

/// Indices of samples whose label in every filtered column is selected.
/// An empty selection hides every row; a sample without the column counts
/// as `Null`.
pub fn filtered_indices(table: &ChemistryTable, filters: &FilterState) -> Vec<usize> {
    // Columns with every label selected do not constrain anything.
    let active: Vec<(&String, &BTreeSet<CellValue>)> = filters
        .iter()
        .filter(|(col, selected)| {
            table
                .unique_values
                .get(*col)
                .map_or(true, |all| selected.len() != all.len())
        })
        .collect();

    table
        .samples
        .iter()
        .enumerate()
        .filter(|(_, sample)| {
            active
                .iter()
                .all(|(col, selected)| selected.contains(sample.get(col)))
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Sample;

    fn table() -> ChemistryTable {
        let rows = [("A", "Summer"), ("B", "Winter"), ("A", "Winter")];
        let samples = rows
            .iter()
            .map(|(site, season)| {
                let mut s = Sample::default();
                s.set("Site", (*site).into());
                s.set("Season", (*season).into());
                s
            })
            .collect();
        ChemistryTable::from_samples(vec!["Site".into(), "Season".into()], samples)
    }

    #[test]
    fn everything_visible_initially() {
        let t = table();
        let filters = init_filter_state(&t, &["Site", "Season"]);
        assert_eq!(filtered_indices(&t, &filters), vec![0, 1, 2]);
    }

    #[test]
    fn deselecting_a_site_hides_its_rows() {
        let t = table();
        let mut filters = init_filter_state(&t, &["Site", "Season"]);
        filters.get_mut("Site").unwrap().remove(&CellValue::from("A"));
        assert_eq!(filtered_indices(&t, &filters), vec![1]);
    }

    #[test]
    fn empty_selection_hides_everything() {
        let t = table();
        let mut filters = init_filter_state(&t, &["Season"]);
        filters.insert("Season".into(), BTreeSet::new());
        assert!(filtered_indices(&t, &filters).is_empty());
    }
}
