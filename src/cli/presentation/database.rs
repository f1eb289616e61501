//! Database instance tables.

use super::dash;
use crate::services::database::Instance;
use crate::table::Table;

pub fn list_table(instances: &[Instance]) -> Table {
    let mut table = Table::new();
    table.set_header(["ID", "NAME", "VERSION", "FLAVOR", "STATE"]);
    for instance in instances {
        table.add_row([
            instance.id.clone(),
            dash(instance.name.as_deref()),
            dash(instance.version.as_deref()),
            instance
                .flavor
                .as_ref()
                .map(|f| format!("{} CPU / {} GB RAM", f.cpu, f.ram))
                .unwrap_or_else(|| "-".to_string()),
            dash(instance.status.as_deref()),
        ]);
    }
    table
}
