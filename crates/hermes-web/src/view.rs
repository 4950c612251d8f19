//! Grid and result views: the JSON shape returned to the front end and the
//! HTML rendered from it.

use hermes_common::columns::PREDICTION_COLUMN;
use hermes_common::PredictionLabel;
use hermes_explain::{ContributionReport, EvaluationView};
use hermes_grid::editor::CellPos;
use hermes_grid::{ContextMenu, PageItem};
use serde::Serialize;

use crate::html::escape;
use crate::state::DataSession;

// ── Grid ──────────────────────────────────────────────────────────────────────

/// Everything needed to draw the current page of one table.
#[derive(Debug, Clone, Serialize)]
pub struct GridView {
    pub id: String,
    pub name: String,
    pub headers: Vec<String>,
    /// Absolute index of the first rendered row
    pub start: usize,
    pub rows: Vec<Vec<String>>,
    pub page: usize,
    pub total_pages: usize,
    pub row_count: usize,
    pub page_items: Vec<PageItem>,
    pub summary: String,
    pub editing: Option<CellPos>,
    pub edit_value: String,
    pub menu: Option<ContextMenu>,
    pub evaluation: Option<EvaluationView>,
}

impl GridView {
    pub fn new(id: &str, session: &DataSession) -> Self {
        let grid = &session.grid;
        let slice = grid.page_slice();
        let rows = slice
            .rows
            .iter()
            .map(|row| {
                slice
                    .headers
                    .iter()
                    .map(|h| row.get(h).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Self {
            id: id.to_string(),
            name: grid.document().name.clone(),
            headers: grid.headers().to_vec(),
            start: slice.start,
            rows,
            page: grid.page(),
            total_pages: grid.total_pages(),
            row_count: grid.row_count(),
            page_items: grid.page_items(),
            summary: grid.showing_summary(),
            editing: grid.editor().editing(),
            edit_value: grid.editor().value().to_string(),
            menu: grid.menu().copied(),
            evaluation: session.evaluation.as_ref().map(EvaluationView::new),
        }
    }

    pub fn render(&self) -> String {
        let head: String = self
            .headers
            .iter()
            .map(|h| format!("<th>{}</th>", escape(h)))
            .collect();

        let body: String = if self.rows.is_empty() {
            format!(
                r#"<tr><td colspan="{}" class="text-muted">No rows. Use "Add row" to start.</td></tr>"#,
                self.headers.len().max(1)
            )
        } else {
            self.rows
                .iter()
                .enumerate()
                .map(|(r, cells)| {
                    let tds: String = cells
                        .iter()
                        .enumerate()
                        .map(|(c, value)| self.render_cell(r, c, value))
                        .collect();
                    format!(r#"<tr data-row="{}">{}</tr>"#, r, tds)
                })
                .collect()
        };

        format!(
            r#"<div class="grid" id="grid" data-id="{id}">
<div class="table-container"><table class="table">
<thead><tr>{head}</tr></thead>
<tbody>{body}</tbody>
</table></div>
<div class="pagination">{pager}<span class="text-muted">{summary}</span>
<label>Go to page <input class="page-jump" inputmode="numeric" size="4"></label>
<button class="btn btn-outline add-row">Add row</button></div>
{menu}
</div>"#,
            id = escape(&self.id),
            head = head,
            body = body,
            pager = self.render_pager(),
            summary = escape(&self.summary),
            menu = self.render_menu(),
        )
    }

    fn render_cell(&self, row: usize, col: usize, value: &str) -> String {
        if self.editing == Some(CellPos { row, col }) {
            return format!(
                r#"<td class="editing"><input class="cell-input" data-row="{}" data-col="{}" value="{}" autofocus></td>"#,
                row,
                col,
                escape(&self.edit_value)
            );
        }
        let class = if self.headers.get(col).is_some_and(|h| h == PREDICTION_COLUMN) {
            format!(" badge badge-{}", PredictionLabel::normalize(value).color())
        } else {
            String::new()
        };
        format!(
            r#"<td class="cell{}" data-row="{}" data-col="{}">{}</td>"#,
            class,
            row,
            col,
            escape(value)
        )
    }

    fn render_pager(&self) -> String {
        self.page_items
            .iter()
            .map(|item| match item {
                PageItem::Page(p) if *p == self.page => {
                    format!(r#"<button class="btn btn-primary page" data-page="{p}" disabled>{p}</button>"#)
                }
                PageItem::Page(p) => format!(r#"<button class="btn btn-outline page" data-page="{p}">{p}</button>"#),
                PageItem::Dots => "<span class=\"dots\">…</span>".to_string(),
            })
            .collect()
    }

    fn render_menu(&self) -> String {
        match self.menu {
            Some(menu) => format!(
                r#"<ul class="context-menu" style="top:{}px;left:{}px" data-row="{}">
<li data-action="insert_above">Insert row above</li>
<li data-action="insert_below">Insert row below</li>
<li data-action="delete">Delete row</li>
</ul>"#,
                menu.top, menu.left, menu.abs_row
            ),
            None => String::new(),
        }
    }
}

// ── Evaluation & contributions ───────────────────────────────────────────────

pub fn render_evaluation(view: &EvaluationView, clear_url: Option<&str>) -> String {
    let accuracy = view
        .accuracy
        .as_deref()
        .map(|a| format!(r#"<span class="badge badge-teal">{}</span>"#, escape(a)))
        .unwrap_or_default();
    let clear = clear_url
        .map(|url| format!(r#"<button class="btn btn-sm clear-evaluation" data-url="{}">Clear</button>"#, escape(url)))
        .unwrap_or_default();
    let rows: String = view
        .rows
        .iter()
        .map(|r| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&r.label),
                r.precision,
                r.recall,
                r.f1_score,
                r.support
            )
        })
        .collect();

    format!(
        r#"<div class="card evaluation">
<div class="card-header"><h3>Evaluation</h3>{accuracy}{clear}</div>
<table class="table"><thead><tr><th>Label</th><th>Precision</th><th>Recall</th><th>F1-score</th><th>Support</th></tr></thead>
<tbody>{rows}</tbody></table>
</div>"#
    )
}

/// Helpful / harmful lists plus the full ranked table.
pub fn render_contributions(report: &ContributionReport, download_url: &str) -> String {
    let list = |items: Vec<&hermes_explain::Contribution>, class: &str| -> String {
        if items.is_empty() {
            return r#"<li class="text-muted">None</li>"#.to_string();
        }
        items
            .iter()
            .map(|c| format!(r#"<li>{} <span class="{}">{}</span></li>"#, escape(&c.feature), class, c.short()))
            .collect()
    };
    let table: String = report
        .ranked()
        .iter()
        .map(|c| format!("<tr><td>{}</td><td>{}</td></tr>", escape(&c.feature), c.precise()))
        .collect();

    format!(
        r#"<div class="contributions">
<p class="text-muted">Positive values support the prediction; negative values oppose it.</p>
<div class="grid-2">
<div><h4>Helpful</h4><ul>{helpful}</ul></div>
<div><h4>Harmful</h4><ul>{harmful}</ul></div>
</div>
<details><summary>All features</summary>
<table class="table"><thead><tr><th>Feature</th><th>Contribution</th></tr></thead><tbody>{table}</tbody></table>
</details>
<a class="btn btn-outline" href="{url}">Download CSV</a>
</div>"#,
        helpful = list(report.helpful(), "text-teal"),
        harmful = list(report.harmful(), "text-red"),
        table = table,
        url = escape(download_url),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_common::CsvDocument;
    use hermes_grid::GridEvent;

    fn session() -> DataSession {
        let doc = CsvDocument::parse("t.csv", b"ra,prediction\n1,CONFIRMED\n2,<b>\n").unwrap();
        DataSession::new(doc, 1)
    }

    #[test]
    fn test_view_reflects_page_and_editor() {
        let mut s = session();
        s.grid.apply(GridEvent::PageChange { page: 2 });
        s.grid.apply(GridEvent::CellClick { row: 0, col: 0 });

        let view = GridView::new("csv-1", &s);
        assert_eq!(view.start, 1);
        assert_eq!(view.rows, vec![vec!["2".to_string(), "<b>".to_string()]]);
        assert_eq!(view.total_pages, 2);
        assert_eq!(view.editing, Some(CellPos { row: 0, col: 0 }));
        assert_eq!(view.edit_value, "2");

        let html = view.render();
        assert!(html.contains(r#"class="cell-input""#));
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("Showing rows 2-2 of 2"));
    }

    #[test]
    fn test_prediction_cells_are_badged() {
        let html = GridView::new("csv-1", &session()).render();
        assert!(html.contains("badge-teal"));
    }

    #[test]
    fn test_menu_rendered_when_open() {
        let mut s = session();
        s.grid.apply(GridEvent::ContextMenu { row: 0, x: 10, y: 20, viewport_w: 800, viewport_h: 600 });
        let html = GridView::new("csv-1", &s).render();
        assert!(html.contains("top:24px;left:14px"));
        assert!(html.contains("insert_below"));
    }
}
