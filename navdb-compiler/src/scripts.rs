//! SQL scripts compiled into the binary and looked up by name.

use rusqlite::Connection;

use crate::error::{CompilerError, Result};

const SCRIPTS: &[(&str, &str)] = &[
    ("create_schema",            include_str!("../sql/create_schema.sql")),
    ("drop_schema",              include_str!("../sql/drop_schema.sql")),
    ("create_indexes_post_load", include_str!("../sql/create_indexes_post_load.sql")),
    ("delete_duplicates",        include_str!("../sql/delete_duplicates.sql")),
    ("update_vor",               include_str!("../sql/update_vor.sql")),
    ("update_wp_ids",            include_str!("../sql/update_wp_ids.sql")),
    ("update_approaches",        include_str!("../sql/update_approaches.sql")),
    ("update_ils_ids",           include_str!("../sql/update_ils_ids.sql")),
    ("update_num_ils",           include_str!("../sql/update_num_ils.sql")),
    ("populate_nav_search",      include_str!("../sql/populate_nav_search.sql")),
    ("populate_route_node",      include_str!("../sql/populate_route_node.sql")),
    ("populate_route_edge",      include_str!("../sql/populate_route_edge.sql")),
    ("finish_schema",            include_str!("../sql/finish_schema.sql")),
    ("xplane/prepare_airway",    include_str!("../sql/xplane/prepare_airway.sql")),
];

pub fn script(name: &str) -> Result<&'static str> {
    SCRIPTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, sql)| *sql)
        .ok_or_else(|| CompilerError::UnknownScript(name.to_string()))
}

pub fn run_script(conn: &Connection, name: &str) -> Result<()> {
    tracing::debug!("Running script {name}");
    conn.execute_batch(script(name)?)?;
    Ok(())
}
