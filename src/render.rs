use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};

use crate::error::ReportError;
use crate::metrics::{self, Face};
use crate::models::{display_number, format_average, StudentSummary};

// US letter, 1in margins.
const PAGE_WIDTH_PT: f64 = 612.0;
const PAGE_HEIGHT_PT: f64 = 792.0;
const MARGIN_PT: f64 = 72.0;

const TITLE_SIZE_PT: f64 = 22.0;
const BODY_SIZE_PT: f64 = 12.0;
const TABLE_SIZE_PT: f64 = 10.0;

const LINE_GAP_PT: f64 = 12.0;
const SECTION_GAP_PT: f64 = 24.0;

const SUBJECT_COL_PT: f64 = 120.0;
const SCORE_COL_PT: f64 = 80.0;
const HEADER_ROW_PT: f64 = 27.0;
const DATA_ROW_PT: f64 = 18.0;
const HEADER_BOTTOM_PAD_PT: f64 = 12.0;
const CELL_INSET_PT: f64 = 6.0;
const GRID_WIDTH_PT: f64 = 1.0;

const FILE_PREFIX: &str = "report_card_";

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn header_fill() -> Color {
    Color::Rgb(Rgb::new(0.5, 0.5, 0.5, None))
}

fn header_text() -> Color {
    Color::Rgb(Rgb::new(0.96, 0.96, 0.96, None))
}

fn row_fill() -> Color {
    Color::Rgb(Rgb::new(0.96, 0.96, 0.86, None))
}

pub fn report_file_name(student_id: &str) -> String {
    format!("{FILE_PREFIX}{student_id}.pdf")
}

/// Lays out one student's report card and writes it into `out_dir`,
/// overwriting any previous file of the same name. Returns the written path.
pub fn write_report_card(
    summary: &StudentSummary,
    out_dir: &Path,
) -> Result<PathBuf, ReportError> {
    let path = out_dir.join(report_file_name(&summary.student_id));
    let render_err = |message: String| ReportError::Render {
        path: path.clone(),
        message,
    };

    let (doc, first_page, first_layer) = PdfDocument::new(
        "Report Card",
        Mm(pt_to_mm(PAGE_WIDTH_PT)),
        Mm(pt_to_mm(PAGE_HEIGHT_PT)),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| render_err(err.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|err| render_err(err.to_string()))?;

    {
        let mut page = Page {
            doc: &doc,
            layer: doc.get_page(first_page).get_layer(first_layer),
            regular,
            bold,
            y: PAGE_HEIGHT_PT - MARGIN_PT,
        };

        let title = "Report Card";
        page.y -= TITLE_SIZE_PT;
        let title_x = (PAGE_WIDTH_PT - metrics::text_width(title, Face::Bold, TITLE_SIZE_PT)) / 2.0;
        page.text(title_x, page.y, Face::Bold, TITLE_SIZE_PT, black(), title);
        page.y -= SECTION_GAP_PT;

        page.labeled_line("Name:", &summary.name);
        page.labeled_line("Student ID:", &summary.student_id);
        page.labeled_line("Total Score:", &display_number(summary.total_score));
        page.labeled_line("Average Score:", &format_average(summary.average_score));
        // Widen the gap between the last labeled line and the table.
        page.y -= SECTION_GAP_PT - LINE_GAP_PT;

        page.table_row("Subject", "Score", true);
        for (subject, score) in &summary.subject_scores {
            page.table_row(subject, &display_number(*score), false);
        }
    }

    let file = File::create(&path).map_err(|err| render_err(err.to_string()))?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|err| render_err(err.to_string()))?;

    Ok(path)
}

/// Cursor over the current page. `y` tracks the top of the unused area in
/// points from the page bottom; content flows downward until `ensure_room`
/// opens a fresh page.
struct Page<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f64,
}

impl Page<'_> {
    fn ensure_room(&mut self, height: f64) {
        if self.y - height < MARGIN_PT {
            let (page, layer) = self.doc.add_page(
                Mm(pt_to_mm(PAGE_WIDTH_PT)),
                Mm(pt_to_mm(PAGE_HEIGHT_PT)),
                "Layer 1",
            );
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_PT - MARGIN_PT;
        }
    }

    fn text(&self, x_pt: f64, baseline_pt: f64, face: Face, size: f64, color: Color, text: &str) {
        let font = match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
        };
        self.layer.set_fill_color(color);
        self.layer
            .use_text(text, size, Mm(pt_to_mm(x_pt)), Mm(pt_to_mm(baseline_pt)), font);
    }

    /// One 12pt line with a bold label and a regular value, flush left.
    fn labeled_line(&mut self, label: &str, value: &str) {
        self.ensure_room(BODY_SIZE_PT + LINE_GAP_PT);
        self.y -= BODY_SIZE_PT;

        let label_width = metrics::text_width(label, Face::Bold, BODY_SIZE_PT);
        let space = metrics::text_width(" ", Face::Regular, BODY_SIZE_PT);
        self.text(MARGIN_PT, self.y, Face::Bold, BODY_SIZE_PT, black(), label);
        self.text(
            MARGIN_PT + label_width + space,
            self.y,
            Face::Regular,
            BODY_SIZE_PT,
            black(),
            value,
        );

        self.y -= LINE_GAP_PT;
    }

    fn table_row(&mut self, subject: &str, score: &str, header: bool) {
        let height = if header { HEADER_ROW_PT } else { DATA_ROW_PT };
        self.ensure_room(height);
        let bottom = self.y - height;

        let face = if header { Face::Bold } else { Face::Regular };
        let baseline = if header {
            bottom + HEADER_BOTTOM_PAD_PT
        } else {
            bottom + (height - TABLE_SIZE_PT) / 2.0
        };

        let mut x = MARGIN_PT;
        for (text, width) in [subject, score]
            .into_iter()
            .zip([SUBJECT_COL_PT, SCORE_COL_PT])
        {
            let fill = if header { header_fill() } else { row_fill() };
            let ink = if header { header_text() } else { black() };

            self.layer.set_fill_color(fill);
            self.layer.add_shape(rect(x, bottom, width, height, true, false));
            self.text(x + CELL_INSET_PT, baseline, face, TABLE_SIZE_PT, ink, text);
            self.layer.set_outline_color(black());
            self.layer.set_outline_thickness(GRID_WIDTH_PT);
            self.layer.add_shape(rect(x, bottom, width, height, false, true));

            x += width;
        }

        self.y = bottom;
    }
}

fn rect(x: f64, y: f64, width: f64, height: f64, fill: bool, stroke: bool) -> Line {
    let corners = [
        (x, y),
        (x + width, y),
        (x + width, y + height),
        (x, y + height),
    ];
    Line {
        points: corners
            .iter()
            .map(|&(px, py)| (Point::new(Mm(pt_to_mm(px)), Mm(pt_to_mm(py))), false))
            .collect(),
        is_closed: true,
        has_fill: fill,
        has_stroke: stroke,
        is_clipping_path: false,
    }
}

fn pt_to_mm(pt: f64) -> f64 {
    pt * 25.4 / 72.0
}
