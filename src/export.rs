use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

use crate::markets::StatKind;
use crate::projection::PlayerProjection;
use crate::state::SalaryInfo;

/// Write the ranked leaderboard to an xlsx workbook. Returns the number of
/// player rows written.
pub fn export_leaderboard(
    path: &Path,
    board: &[PlayerProjection],
    salaries: &HashMap<String, SalaryInfo>,
) -> Result<usize> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Leaderboard").context("name sheet")?;

    let mut header = vec![
        "Rank".to_string(),
        "Player".to_string(),
        "Position".to_string(),
        "Projected Points".to_string(),
    ];
    for stat in StatKind::ALL {
        header.push(stat.label().to_string());
        header.push(format!("{} Prob", stat.label()));
    }
    header.push("Salary".to_string());
    header.push("External Points".to_string());

    for (col, text) in header.iter().enumerate() {
        sheet
            .write_string(0, col as u16, text)
            .context("write header cell")?;
    }

    for (idx, player) in board.iter().enumerate() {
        let row = (idx + 1) as u32;
        let mut col: u16 = 0;
        sheet.write_number(row, col, (idx + 1) as f64).context("write rank")?;
        col += 1;
        sheet
            .write_string(row, col, &player.player_name)
            .context("write player")?;
        col += 1;
        sheet
            .write_string(row, col, &player.position)
            .context("write position")?;
        col += 1;
        sheet
            .write_number(row, col, player.total_points)
            .context("write total")?;
        col += 1;

        for stat in StatKind::ALL {
            let sp = player.stat(stat);
            sheet.write_number(row, col, sp.quantity).context("write quantity")?;
            col += 1;
            sheet
                .write_number(row, col, sp.probability)
                .context("write probability")?;
            col += 1;
        }

        let info = salaries.get(&player.player_name.to_lowercase());
        if let Some(salary) = info.and_then(|i| i.salary) {
            sheet.write_number(row, col, salary).context("write salary")?;
        }
        col += 1;
        if let Some(points) = info.and_then(|i| i.external_points) {
            sheet
                .write_number(row, col, points)
                .context("write external points")?;
        }
    }

    workbook.save(path).context("save workbook")?;
    Ok(board.len())
}
