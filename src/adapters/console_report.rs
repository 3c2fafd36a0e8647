//! Plain-text table of the store for terminal output.

use crate::domain::store::VariableStore;
use crate::domain::variable::Field;

const NAME_WIDTH: usize = 14;
const VALUE_WIDTH: usize = 18;

pub fn render_table(store: &VariableStore) -> String {
    let mut out = String::from("Variable Database Contents:\n");

    let mut header = format!("{:<NAME_WIDTH$}", "Variable");
    for field in Field::ALL {
        header.push_str(&format!(" {:>VALUE_WIDTH$}", field.column()));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&"=".repeat(NAME_WIDTH + Field::ALL.len() * (VALUE_WIDTH + 1)));
    out.push('\n');

    for (variable, record) in store.records() {
        let mut line = format!("{:<NAME_WIDTH$}", variable.name());
        for field in Field::ALL {
            line.push_str(&format!(" {:>VALUE_WIDTH$}", record.field(field).to_string()));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}
