// Data context for model prompts
//
// Describes a dataset collection as plain text: shape, column names, and a
// few sample rows. The prompt wrapper adds the assistant instructions and
// the user's question. Nothing here talks to a model.

use crate::dataset::{Dataset, DatasetCollection, Scalar};

/// Sample rows per dataset when nothing else is configured
pub const DEFAULT_SAMPLE_ROWS: usize = 3;

#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// Rows to show under "Sample data" for each dataset
    pub sample_rows: usize,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self { sample_rows: DEFAULT_SAMPLE_ROWS }
    }
}

/// Render the "Data structure" description of a collection
pub fn render_context(collection: &DatasetCollection, options: &ContextOptions) -> String {
    let mut result = String::from("Data structure:\n");
    for dataset in collection {
        render_dataset(&mut result, dataset, options);
    }
    result
}

fn render_dataset(out: &mut String, dataset: &Dataset, options: &ContextOptions) {
    out.push_str(&format!("\nTable/Sheet: {}\n", dataset.name()));
    out.push_str(&format!(
        "Columns ({}): {}\n",
        dataset.column_count(),
        dataset.column_names().join(", ")
    ));
    out.push_str(&format!("Number of rows: {}\n", dataset.row_count()));

    if dataset.row_count() > 0 && options.sample_rows > 0 {
        out.push_str(&format!("Sample data (first {} rows):\n", options.sample_rows));
        for (i, row) in dataset.rows().iter().take(options.sample_rows).enumerate() {
            out.push_str(&format!("Row {}: {}\n", i + 1, render_row(row)));
        }
    }
}

fn render_row(row: &[Scalar]) -> String {
    let cells: Vec<String> = row.iter().map(render_scalar).collect();
    format!("[{}]", cells.join(", "))
}

/// Values render as JSON literals so strings stay visibly quoted
fn render_scalar(value: &Scalar) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// Full prompt: assistant instructions, data context, then the question
pub fn render_prompt(query: &str, collection: &DatasetCollection, options: &ContextOptions) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are a database and data analysis assistant. \
         Analyze the data provided and answer the user's query.\n\n",
    );

    prompt.push_str("DATA CONTEXT:\n");
    prompt.push_str(&render_context(collection, options));
    prompt.push('\n');

    prompt.push_str("USER QUERY:\n");
    prompt.push_str(query.trim());
    prompt.push('\n');

    prompt.push_str("\nProvide a detailed and helpful response based on the data.\n");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DatasetCollection {
        let mut c = DatasetCollection::new();
        c.insert(
            Dataset::new(
                "people",
                vec!["name".into(), "age".into()],
                vec![
                    vec![Scalar::from("Ada"), Scalar::Int(36)],
                    vec![Scalar::from("Alan"), Scalar::Int(41)],
                    vec![Scalar::from("Grace"), Scalar::Null],
                    vec![Scalar::from("Edsger"), Scalar::Float(72.5)],
                ],
            )
            .unwrap(),
        );
        c.insert(Dataset::new("empty", vec!["x".into()], vec![]).unwrap());
        c
    }

    #[test]
    fn test_context_layout() {
        let text = render_context(&sample(), &ContextOptions::default());
        let expected = "Data structure:\n\
            \nTable/Sheet: people\n\
            Columns (2): name, age\n\
            Number of rows: 4\n\
            Sample data (first 3 rows):\n\
            Row 1: [\"Ada\", 36]\n\
            Row 2: [\"Alan\", 41]\n\
            Row 3: [\"Grace\", null]\n\
            \nTable/Sheet: empty\n\
            Columns (1): x\n\
            Number of rows: 0\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_sample_size_is_configurable() {
        let text = render_context(&sample(), &ContextOptions { sample_rows: 1 });
        assert!(text.contains("Sample data (first 1 rows):\nRow 1: [\"Ada\", 36]\n\nTable/Sheet"));
        assert!(!text.contains("Row 2"));

        let text = render_context(&sample(), &ContextOptions { sample_rows: 0 });
        assert!(!text.contains("Sample data"));
    }

    #[test]
    fn test_prompt_sections_in_order() {
        let prompt = render_prompt("  which person is oldest?  ", &sample(), &ContextOptions::default());
        let ctx = prompt.find("DATA CONTEXT:").unwrap();
        let query = prompt.find("USER QUERY:\nwhich person is oldest?\n").unwrap();
        assert!(ctx < query);
        assert!(prompt.contains("Table/Sheet: people"));
    }

    #[test]
    fn test_empty_collection_context() {
        let text = render_context(&DatasetCollection::new(), &ContextOptions::default());
        assert_eq!(text, "Data structure:\n");
    }
}
