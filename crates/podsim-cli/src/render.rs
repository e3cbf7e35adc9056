//! Plain-text table rendering

use podsim_core::{Cluster, Decision};

/// Render rows under headers with columns padded to their widest cell
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header_cells, &widths);
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    for (i, cell) in cells.iter().enumerate() {
        if i == last {
            out.push_str(cell);
        } else {
            let width = widths.get(i).copied().unwrap_or(0);
            out.push_str(&format!("{:<width$}  ", cell, width = width));
        }
    }
    out.push('\n');
}

/// One row per decision: pod, node (or "unscheduled"), reason
pub fn decisions_table(decisions: &[Decision]) -> String {
    let rows: Vec<Vec<String>> = decisions
        .iter()
        .map(|d| {
            vec![
                d.pod.full_name(),
                d.node.clone().unwrap_or_else(|| "unscheduled".to_string()),
                d.reason.to_string(),
            ]
        })
        .collect();
    render_table(&["POD", "NODE", "REASON"], &rows)
}

/// One row per node with used and free values for every resource dimension
pub fn cluster_table(cluster: &Cluster) -> String {
    let rows: Vec<Vec<String>> = cluster
        .nodes
        .iter()
        .map(|n| {
            let free = n.remaining();
            vec![
                n.name.clone(),
                n.allocated.cpu_milli.to_string(),
                free.cpu_milli.to_string(),
                n.allocated.memory_mb.to_string(),
                free.memory_mb.to_string(),
                n.allocated.gpus.to_string(),
                free.gpus.to_string(),
            ]
        })
        .collect();
    render_table(
        &[
            "NODE",
            "CPU USED(m)",
            "CPU FREE(m)",
            "MEM USED(MB)",
            "MEM FREE(MB)",
            "GPU USED",
            "GPU FREE",
        ],
        &rows,
    )
}
