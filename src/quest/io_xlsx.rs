use calamine::{open_workbook, DataType, Reader, Xlsx};
use std::collections::HashMap;

use crate::quest::*;

fn get_range(path: &str, worksheet_name_o: Option<String>) -> QuestResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu { path }.fail(),
            [(worksheet_name, wrange)] => {
                debug!("get_range: path: {:?} worksheet: {:?}", &path, &worksheet_name);
                Ok(wrange.clone())
            }
            _ => {
                let names: Vec<String> = all_worksheets.iter().map(|(n, _)| n.clone()).collect();
                whatever!(
                    "Multiple worksheets in {}, pass --excel-worksheet-name to pick one of {:?}",
                    path,
                    names
                )
            }
        }
    }
}

// Maps the lowercase header names to their column.
fn get_col_index(header: &[DataType]) -> HashMap<String, usize> {
    header
        .iter()
        .enumerate()
        .filter_map(|(idx, cell)| match cell {
            DataType::String(s) => Some((s.trim().to_lowercase(), idx)),
            _ => None,
        })
        .collect()
}

fn required_col(cols: &HashMap<String, usize>, column: &str, path: &str) -> QuestResult<usize> {
    cols.get(column)
        .cloned()
        .context(MissingColumnSnafu { column, path })
}

fn cell_text(cell: Option<&DataType>, lineno: u64) -> QuestResult<String> {
    match cell {
        None | Some(DataType::Empty) => Ok("".to_string()),
        Some(DataType::String(s)) => Ok(s.clone()),
        Some(DataType::Int(i)) => Ok(i.to_string()),
        // Spreadsheets store most numbers as floats.
        Some(DataType::Float(f)) if f.fract() == 0.0 && *f >= 0.0 => Ok(format!("{}", *f as u64)),
        Some(c) => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", c),
        }
        .fail(),
    }
}

/// Reads the posts of a thread from a worksheet.
///
/// The first row is a header naming the columns author, id, number and text.
/// A permalink column is optional. Rows without an author are skipped.
pub fn read_excel_posts(
    path: &str,
    worksheet_name: Option<String>,
    thread: &str,
) -> QuestResult<Vec<Post>> {
    let wrange = get_range(path, worksheet_name)?;

    let header = wrange.rows().next().context(EmptyExcelSnafu { path })?;
    debug!("read_excel_posts: header: {:?}", header);
    let cols = get_col_index(header);
    let author_idx = required_col(&cols, "author", path)?;
    let id_idx = required_col(&cols, "id", path)?;
    let number_idx = required_col(&cols, "number", path)?;
    let text_idx = required_col(&cols, "text", path)?;
    let permalink_idx = cols.get("permalink").cloned();

    let mut res: Vec<Post> = Vec::new();
    for (idx, row) in wrange.rows().enumerate().skip(1) {
        let lineno = idx as u64 + 1;
        let author = cell_text(row.get(author_idx), lineno)?;
        if author.trim().is_empty() {
            debug!("read_excel_posts: skipping row {} without author", lineno);
            continue;
        }
        let id = cell_text(row.get(id_idx), lineno)?;
        let number_s = cell_text(row.get(number_idx), lineno)?;
        let number = match number_s.trim().parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                return ExcelWrongCellTypeSnafu {
                    lineno,
                    content: number_s,
                }
                .fail()
            }
        };
        let text = cell_text(row.get(text_idx), lineno)?;
        let permalink = match permalink_idx {
            Some(p_idx) => cell_text(row.get(p_idx), lineno)?,
            None => "".to_string(),
        };
        let origin = Origin::new(&author, PostId::new(&id), number, thread, &permalink);
        res.push(Post::new(origin, &text));
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_columns_are_case_insensitive() {
        let header = vec![
            DataType::String("Author".to_string()),
            DataType::Empty,
            DataType::String(" ID ".to_string()),
        ];
        let cols = get_col_index(&header);
        assert_eq!(cols.get("author"), Some(&0));
        assert_eq!(cols.get("id"), Some(&2));
        assert!(required_col(&cols, "text", "posts.xlsx").is_err());
    }

    #[test]
    fn cells_as_text() {
        assert_eq!(cell_text(Some(&DataType::Float(12.0)), 1).unwrap(), "12");
        assert_eq!(cell_text(Some(&DataType::Int(7)), 1).unwrap(), "7");
        assert_eq!(cell_text(None, 1).unwrap(), "");
        assert!(cell_text(Some(&DataType::Float(1.5)), 1).is_err());
        assert!(cell_text(Some(&DataType::Bool(true)), 1).is_err());
    }
}
