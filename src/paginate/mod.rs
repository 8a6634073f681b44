//! Atomic pagination.
//!
//! Sections are packed greedily, in order, onto pages of a fixed useful
//! height. Sections are never split: one that does not fit on the current
//! page moves wholesale to the next, and one taller than a whole page is
//! placed alone and reported.

mod measure;

pub use measure::{EstimateMetrics, EstimatedHeight, Measure};

use crate::diagnostics::Diagnostic;
use crate::error::{Error, Result};
use crate::model::{Page, Section};
use serde::Serialize;

/// A4 page height in millimetres.
pub const A4_HEIGHT_MM: f32 = 297.0;

/// Vertical reservations on a page, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMargins {
    /// Top margin
    pub top: f32,
    /// Bottom margin
    pub bottom: f32,
    /// Space reserved for the running header
    pub header: f32,
    /// Space reserved for the running footer
    pub footer: f32,
}

impl PageMargins {
    /// Create margins with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set top and bottom margins.
    pub fn with_margins(mut self, top: f32, bottom: f32) -> Self {
        self.top = top;
        self.bottom = bottom;
        self
    }

    /// Reserve space for a running header.
    pub fn with_header(mut self, height: f32) -> Self {
        self.header = height;
        self
    }

    /// Reserve space for a running footer.
    pub fn with_footer(mut self, height: f32) -> Self {
        self.footer = height;
        self
    }

    /// Total vertical reservation.
    pub fn total(&self) -> f32 {
        self.top + self.bottom + self.header + self.footer
    }
}

impl Default for PageMargins {
    fn default() -> Self {
        Self {
            top: 3.0,
            bottom: 3.0,
            header: 0.0,
            footer: 0.0,
        }
    }
}

/// Useful height available for section content on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBudget {
    useful_height: f32,
}

impl PageBudget {
    /// Create a budget; the height must be finite and positive.
    pub fn new(useful_height: f32) -> Result<Self> {
        if useful_height.is_finite() && useful_height > 0.0 {
            Ok(Self { useful_height })
        } else {
            Err(Error::InvalidPageHeight(useful_height))
        }
    }

    /// Budget of a page of the given height after margins.
    pub fn from_page(page_height: f32, margins: PageMargins) -> Result<Self> {
        Self::new(page_height - margins.total())
    }

    /// Budget of an A4 page after margins.
    pub fn a4(margins: PageMargins) -> Result<Self> {
        Self::from_page(A4_HEIGHT_MM, margins)
    }

    /// Get the useful height.
    pub fn useful_height(&self) -> f32 {
        self.useful_height
    }
}

impl Default for PageBudget {
    /// A4 with the default margins.
    fn default() -> Self {
        Self {
            useful_height: A4_HEIGHT_MM - PageMargins::default().total(),
        }
    }
}

/// Result of paginating a section list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    /// Pages in order
    pub pages: Vec<Page>,
    /// Oversized sections
    pub diagnostics: Vec<Diagnostic>,
}

impl Pagination {
    /// Section indices of all pages, concatenated.
    pub fn flatten(&self) -> Vec<usize> {
        self.pages
            .iter()
            .flat_map(|p| p.sections.iter().copied())
            .collect()
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page number holding a section.
    pub fn page_of(&self, section: usize) -> Option<u32> {
        self.pages
            .iter()
            .find(|p| p.sections.contains(&section))
            .map(|p| p.number)
    }
}

/// Assign sections to pages.
///
/// `measure` is called exactly once per section. Negative or non-finite
/// heights count as zero.
///
/// # Example
///
/// ```
/// use protolayout::model::{Section, TextSection};
/// use protolayout::paginate::{paginate, PageBudget};
///
/// let sections: Vec<Section> = (0..3)
///     .map(|i| TextSection::new(format!("s{}", i), "text").into())
///     .collect();
/// let budget = PageBudget::new(100.0)?;
/// let pagination = paginate(&sections, &|_: &Section| -> f32 { 40.0 }, &budget);
/// assert_eq!(pagination.page_count(), 2);
/// assert_eq!(pagination.flatten(), vec![0, 1, 2]);
/// # Ok::<(), protolayout::Error>(())
/// ```
pub fn paginate<M>(sections: &[Section], measure: &M, budget: &PageBudget) -> Pagination
where
    M: Measure + ?Sized,
{
    let useful = budget.useful_height();
    let mut pages = Vec::new();
    let mut diagnostics = Vec::new();
    let mut current = Page::new(1);
    let mut remaining = useful;

    for (index, section) in sections.iter().enumerate() {
        let height = sanitize(measure.measure(section), section);

        let forced = section.page_break_before() && !current.is_empty();
        let overflows = height > remaining && !current.is_empty();
        if forced || overflows {
            log::debug!(
                "page {} closed before section {} ({})",
                current.number,
                section.id(),
                if forced { "forced break" } else { "does not fit" }
            );
            let next = current.number + 1;
            pages.push(close(current, useful));
            current = Page::new(next);
            remaining = useful;
        }

        if section.is_table() && height > useful {
            diagnostics.push(
                Diagnostic::OversizedSection {
                    section: index,
                    id: section.id().to_string(),
                    height,
                    budget: useful,
                }
                .emit(),
            );
        }

        current.push(index, height);
        remaining -= height;
    }

    if !current.is_empty() {
        pages.push(close(current, useful));
    }

    log::info!(
        "paginated {} sections onto {} pages",
        sections.len(),
        pages.len()
    );

    Pagination { pages, diagnostics }
}

fn sanitize(height: f32, section: &Section) -> f32 {
    if height.is_finite() && height >= 0.0 {
        height
    } else {
        log::debug!(
            "section {} measured {}, counted as 0",
            section.id(),
            height
        );
        0.0
    }
}

fn close(mut page: Page, useful: f32) -> Page {
    page.overflow = page.height > useful;
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TableSection, TextSection};

    fn text(id: &str) -> Section {
        TextSection::new(id, "").into()
    }

    fn table(id: &str) -> Section {
        TableSection::new(id).into()
    }

    fn heights(values: &[f32]) -> impl Fn(&Section) -> f32 + '_ {
        move |s: &Section| {
            let i: usize = s.id()[1..].parse().unwrap_or(0);
            values[i]
        }
    }

    #[test]
    fn test_budget_validation() {
        assert!(PageBudget::new(800.0).is_ok());
        assert!(matches!(PageBudget::new(0.0), Err(Error::InvalidPageHeight(_))));
        assert!(PageBudget::new(-1.0).is_err());
        assert!(PageBudget::new(f32::NAN).is_err());
        assert!(PageBudget::new(f32::INFINITY).is_err());
    }

    #[test]
    fn test_a4_budget() {
        let budget = PageBudget::a4(PageMargins::default()).unwrap();
        assert!((budget.useful_height() - 291.0).abs() < 1e-4);
        assert_eq!(budget, PageBudget::default());

        let tight = PageMargins::new().with_margins(150.0, 150.0);
        assert!(PageBudget::a4(tight).is_err());
    }

    #[test]
    fn test_empty_input() {
        let budget = PageBudget::new(100.0).unwrap();
        let pagination = paginate(&[], &|_: &Section| -> f32 { 1.0 }, &budget);
        assert!(pagination.pages.is_empty());
        assert!(pagination.flatten().is_empty());
    }

    #[test]
    fn test_greedy_packing() {
        let sections = vec![text("s0"), text("s1"), text("s2"), text("s3")];
        let values = [30.0, 30.0, 50.0, 10.0];
        let budget = PageBudget::new(100.0).unwrap();
        let pagination = paginate(&sections, &heights(&values), &budget);
        assert_eq!(pagination.pages[0].sections, vec![0, 1]);
        assert_eq!(pagination.pages[1].sections, vec![2, 3]);
        assert_eq!(pagination.page_of(3), Some(2));
        assert!(pagination.diagnostics.is_empty());
    }

    #[test]
    fn test_exact_fit_stays() {
        let sections = vec![text("s0"), table("s1")];
        let values = [40.0, 60.0];
        let budget = PageBudget::new(100.0).unwrap();
        let pagination = paginate(&sections, &heights(&values), &budget);
        assert_eq!(pagination.page_count(), 1);
        assert!(!pagination.pages[0].overflow);
    }

    #[test]
    fn test_oversized_text_is_not_reported() {
        let sections = vec![text("s0")];
        let values = [500.0];
        let budget = PageBudget::new(100.0).unwrap();
        let pagination = paginate(&sections, &heights(&values), &budget);
        assert!(pagination.diagnostics.is_empty());
        assert!(pagination.pages[0].overflow);
    }

    #[test]
    fn test_invalid_heights_count_as_zero() {
        let sections = vec![text("s0"), text("s1"), text("s2")];
        let values = [f32::NAN, -5.0, 100.0];
        let budget = PageBudget::new(100.0).unwrap();
        let pagination = paginate(&sections, &heights(&values), &budget);
        assert_eq!(pagination.page_count(), 1);
        assert_eq!(pagination.pages[0].height, 100.0);
    }

    #[test]
    fn test_forced_break_on_first_section() {
        let sections = vec![TextSection::new("s0", "").with_page_break().into(), text("s1")];
        let values = [10.0, 10.0];
        let budget = PageBudget::new(100.0).unwrap();
        let pagination = paginate(&sections, &heights(&values), &budget);
        assert_eq!(pagination.page_count(), 1);
        assert_eq!(pagination.pages[0].number, 1);
    }
}
