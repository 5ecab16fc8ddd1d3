//! Static fixture datasets attached to analysis results.
//!
//! The dashboard has no real data source: the model only picks a category
//! label and the matching table below is what gets charted.

use super::types::{DatasetLabel, Record};

type Row = (&'static str, &'static [(&'static str, f64)]);

const SALES: &[Row] = &[
    ("Jan", &[("Product A", 4000.0), ("Product B", 2400.0), ("Product C", 1800.0)]),
    ("Feb", &[("Product A", 3000.0), ("Product B", 1398.0), ("Product C", 2800.0)]),
    ("Mar", &[("Product A", 2000.0), ("Product B", 9800.0), ("Product C", 2200.0)]),
    ("Apr", &[("Product A", 2780.0), ("Product B", 3908.0), ("Product C", 2000.0)]),
    ("May", &[("Product A", 1890.0), ("Product B", 4800.0), ("Product C", 2181.0)]),
    ("Jun", &[("Product A", 2390.0), ("Product B", 3800.0), ("Product C", 2500.0)]),
];

const CUSTOMERS: &[Row] = &[
    ("18-24", &[("Male", 1200.0), ("Female", 1800.0), ("Other", 200.0)]),
    ("25-34", &[("Male", 5000.0), ("Female", 6800.0), ("Other", 800.0)]),
    ("35-44", &[("Male", 4200.0), ("Female", 4800.0), ("Other", 600.0)]),
    ("45-54", &[("Male", 3800.0), ("Female", 3600.0), ("Other", 400.0)]),
];

const MARKETING: &[Row] = &[
    ("Email", &[("value", 4000.0)]),
    ("Social", &[("value", 3000.0)]),
    ("Content", &[("value", 2000.0)]),
    ("PPC", &[("value", 2780.0)]),
];

/// Records of the dataset identified by `label`.
pub fn records(label: DatasetLabel) -> Vec<Record> {
    let rows = match label {
        DatasetLabel::Sales => SALES,
        DatasetLabel::Customers => CUSTOMERS,
        DatasetLabel::Marketing => MARKETING,
    };
    rows.iter()
        .map(|(name, values)| Record::new(*name, values))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::series_names;

    #[test]
    fn every_dataset_is_non_empty() {
        for label in DatasetLabel::ALL {
            assert!(!records(label).is_empty(), "{label} is empty");
        }
    }

    #[test]
    fn sales_rows_are_months() {
        let sales = records(DatasetLabel::Sales);
        let names: Vec<&str> = sales.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Jan", "Feb", "Mar", "Apr", "May", "Jun"]);
        assert_eq!(sales[2].value("Product B"), Some(9800.0));
    }

    #[test]
    fn customer_series_keep_listed_order() {
        let customers = records(DatasetLabel::Customers);
        assert_eq!(series_names(&customers), ["Male", "Female", "Other"]);
        let json = serde_json::to_string(&customers[0]).unwrap();
        assert!(json.find("Male").unwrap() < json.find("Female").unwrap());
    }

    #[test]
    fn marketing_has_single_value_series() {
        let marketing = records(DatasetLabel::Marketing);
        assert!(marketing.iter().all(|r| r.values.len() == 1));
        assert_eq!(marketing[3].name, "PPC");
        assert_eq!(marketing[3].value("value"), Some(2780.0));
    }

    #[test]
    fn customers_split_by_gender() {
        let customers = records(DatasetLabel::Customers);
        assert_eq!(customers.len(), 4);
        assert_eq!(customers[1].value("Female"), Some(6800.0));
    }
}
