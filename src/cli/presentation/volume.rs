//! Volume tables.

use super::{dash, labels_summary};
use crate::services::volume::Volume;
use crate::table::Table;

pub fn list_table(volumes: &[Volume]) -> Table {
    let mut table = Table::new();
    table.set_header(["ID", "NAME", "AVAILABILITY ZONE", "SIZE (GB)", "STATE"]);
    for volume in volumes {
        table.add_row([
            volume.id.clone(),
            dash(volume.name.as_deref()),
            dash(volume.availability_zone.as_deref()),
            volume.size.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
            dash(volume.status.as_deref()),
        ]);
    }
    table
}

pub fn describe_table(volume: &Volume) -> Table {
    let mut table = Table::new();
    table.add_row(["ID".to_string(), volume.id.clone()]);
    table.add_row(["NAME".to_string(), dash(volume.name.as_deref())]);
    table.add_row([
        "AVAILABILITY ZONE".to_string(),
        dash(volume.availability_zone.as_deref()),
    ]);
    table.add_row([
        "SIZE (GB)".to_string(),
        volume.size.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
    ]);
    table.add_row([
        "PERFORMANCE CLASS".to_string(),
        dash(volume.performance_class.as_deref()),
    ]);
    table.add_row(["STATE".to_string(), dash(volume.status.as_deref())]);
    table.add_row(["DESCRIPTION".to_string(), dash(volume.description.as_deref())]);
    table.add_row(["LABELS".to_string(), labels_summary(volume.labels.as_ref())]);
    table
}
