use tracing::{debug, warn};

use super::RasterizationError;

/// Default upscaling factor for preview images.
pub const DEFAULT_RENDER_SCALE: f32 = 2.0;

/// Smallest scale accepted; anything lower is raised to it.
pub const MIN_RENDER_SCALE: f32 = 2.0;

/// PDF page rendering abstraction (allows mocking for tests)
pub trait PdfPageRenderer {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, RasterizationError>;

    /// Render one zero-based page to PNG bytes.
    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_index: usize,
        scale: f32,
    ) -> Result<Vec<u8>, RasterizationError>;
}

/// One rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// Zero-based page index.
    pub page_index: usize,
    pub png: Vec<u8>,
}

/// Lazy page-by-page rendering of one document.
///
/// Yields one item per page in page order. A document that cannot be
/// opened yields a single error and ends.
pub struct PageImages<'a> {
    renderer: &'a dyn PdfPageRenderer,
    pdf_bytes: &'a [u8],
    scale: f32,
    next_page: usize,
    page_count: Result<usize, Option<RasterizationError>>,
}

impl<'a> PageImages<'a> {
    /// Total pages, when the document could be opened.
    pub fn page_count(&self) -> Option<usize> {
        self.page_count.as_ref().ok().copied()
    }
}

impl Iterator for PageImages<'_> {
    type Item = Result<PageImage, RasterizationError>;

    fn next(&mut self) -> Option<Self::Item> {
        let count = match &mut self.page_count {
            Ok(count) => *count,
            Err(pending) => return pending.take().map(Err),
        };
        if self.next_page >= count {
            return None;
        }
        let page_index = self.next_page;
        self.next_page += 1;
        Some(
            self.renderer
                .render_page(self.pdf_bytes, page_index, self.scale)
                .map(|png| PageImage { page_index, png }),
        )
    }
}

/// Everything one rendering pass produced.
#[derive(Debug, Default)]
pub struct RasterOutcome {
    /// PNG bytes of successfully rendered pages, in page order.
    pub images: Vec<Vec<u8>>,
    pub failures: Vec<RasterizationError>,
    pub page_count: Option<usize>,
}

/// Renders PDFs to preview images at a fixed scale.
pub struct PdfRasterizer {
    renderer: Box<dyn PdfPageRenderer + Send + Sync>,
    scale: f32,
}

impl PdfRasterizer {
    pub fn new(renderer: Box<dyn PdfPageRenderer + Send + Sync>, scale: f32) -> Self {
        let scale = if scale.is_finite() && scale >= MIN_RENDER_SCALE {
            scale
        } else {
            warn!(requested = scale, "Render scale below minimum, using {MIN_RENDER_SCALE}");
            MIN_RENDER_SCALE
        };
        Self { renderer, scale }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Start a fresh lazy pass over the document's pages. Call again to
    /// restart from the first page.
    pub fn pages<'a>(&'a self, pdf_bytes: &'a [u8]) -> PageImages<'a> {
        let page_count = self.renderer.page_count(pdf_bytes).map_err(Some);
        PageImages {
            renderer: self.renderer.as_ref(),
            pdf_bytes,
            scale: self.scale,
            next_page: 0,
            page_count,
        }
    }

    /// Render every page, collecting failures instead of stopping on them.
    pub fn render(&self, pdf_bytes: &[u8]) -> RasterOutcome {
        let pages = self.pages(pdf_bytes);
        let page_count = pages.page_count();
        let mut outcome = RasterOutcome {
            page_count,
            ..RasterOutcome::default()
        };

        for page in pages {
            match page {
                Ok(image) => outcome.images.push(image.png),
                Err(e) => {
                    warn!(error = %e, "Preview rendering failed");
                    outcome.failures.push(e);
                }
            }
        }

        debug!(
            pages = ?page_count,
            rendered = outcome.images.len(),
            failed = outcome.failures.len(),
            scale = self.scale,
            "Rasterized PDF"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::rasterize::MockPdfPageRenderer;

    fn rasterizer(mock: MockPdfPageRenderer) -> PdfRasterizer {
        PdfRasterizer::new(Box::new(mock), DEFAULT_RENDER_SCALE)
    }

    #[test]
    fn renders_one_image_per_page() {
        let r = rasterizer(MockPdfPageRenderer::new(3));
        let outcome = r.render(b"%PDF");
        assert_eq!(outcome.images.len(), 3);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.page_count, Some(3));
    }

    #[test]
    fn failed_page_is_skipped_not_fatal() {
        let r = rasterizer(MockPdfPageRenderer::new(4).failing_on(&[1]));
        let outcome = r.render(b"%PDF");
        assert_eq!(outcome.images.len(), 3);
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(
            outcome.failures[0],
            RasterizationError::PageRender { page: 1, .. }
        ));
    }

    #[test]
    fn unopenable_document_yields_single_error() {
        let r = rasterizer(MockPdfPageRenderer::unopenable());
        let mut pages = r.pages(b"garbage");
        assert_eq!(pages.page_count(), None);
        assert!(matches!(
            pages.next(),
            Some(Err(RasterizationError::DocumentLoad(_)))
        ));
        assert!(pages.next().is_none());

        let outcome = r.render(b"garbage");
        assert!(outcome.images.is_empty());
        assert_eq!(outcome.failures.len(), 1);
    }

    #[test]
    fn pages_are_lazy_and_ordered() {
        let r = rasterizer(MockPdfPageRenderer::new(3));
        let mut pages = r.pages(b"%PDF");
        let first = pages.next().unwrap().unwrap();
        assert_eq!(first.page_index, 0);
        let rest: Vec<usize> = pages.map(|p| p.unwrap().page_index).collect();
        assert_eq!(rest, vec![1, 2]);
    }

    #[test]
    fn passes_are_restartable_and_deterministic() {
        let r = rasterizer(MockPdfPageRenderer::new(5).failing_on(&[2]));
        let first = r.render(b"%PDF").images.len();
        let second = r.render(b"%PDF").images.len();
        assert_eq!(first, 4);
        assert_eq!(first, second);
        assert_eq!(r.pages(b"%PDF").count(), 5);
    }

    #[test]
    fn zero_page_document_is_empty() {
        let r = rasterizer(MockPdfPageRenderer::new(0));
        let outcome = r.render(b"%PDF");
        assert!(outcome.images.is_empty());
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn scale_below_minimum_is_raised() {
        let r = PdfRasterizer::new(Box::new(MockPdfPageRenderer::new(1)), 1.0);
        assert_eq!(r.scale(), MIN_RENDER_SCALE);
        let r = PdfRasterizer::new(Box::new(MockPdfPageRenderer::new(1)), f32::NAN);
        assert_eq!(r.scale(), MIN_RENDER_SCALE);
        let r = PdfRasterizer::new(Box::new(MockPdfPageRenderer::new(1)), 3.0);
        assert_eq!(r.scale(), 3.0);
    }
}
