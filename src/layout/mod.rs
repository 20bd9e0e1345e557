//! Slide layout: fills the template with placeholder values and tidies the
//! shapes around them.
//!
//! Each slide goes through the same stages in order:
//!
//! 1. text substitution ([`substitute`])
//! 2. case-study images ([`images`])
//! 3. logos ([`logos`])
//! 4. grey category boxes and white label boxes ([`boxes`])
//! 5. metric and label merging ([`metrics`])
//! 6. the overview arrangement ([`overview`]), on the overview slide only
//!
//! A failing stage is logged and skipped; the slide keeps whatever the
//! earlier stages produced.
pub mod boxes;
pub mod images;
pub mod index;
pub mod logos;
pub mod metrics;
pub mod overview;
pub mod raster;
pub mod substitute;
pub mod wrap;

use tracing::{debug, info, warn};

use crate::common::Result;
use crate::config::LayoutConfig;
use crate::ooxml::opc::PackURI;
use crate::ooxml::pptx::{ImageFormat, Package, SlideDocument};
use crate::placeholders::keys;
use crate::placeholders::PlaceholderTable;

/// What a stage needs to know about the slide it is working on.
#[derive(Debug, Clone, Copy)]
pub struct SlideContext<'a> {
    pub config: &'a LayoutConfig,
    /// Zero-based position in the template
    pub index: usize,
}

impl<'a> SlideContext<'a> {
    pub fn new(config: &'a LayoutConfig, index: usize) -> Self {
        Self { config, index }
    }

    #[inline]
    pub fn is_overview(&self) -> bool {
        self.index == self.config.overview_slide_index
    }

    #[inline]
    pub fn is_detail(&self) -> bool {
        self.index == self.config.detail_slide_index
    }
}

/// Destination for image bytes placed on a slide.
pub trait MediaSink {
    /// Store the image and return the relationship id that shows it.
    fn embed(&mut self, data: Vec<u8>, format: ImageFormat) -> Result<String>;
}

/// Embeds images as media parts related from one slide.
pub struct SlideMedia<'p> {
    package: &'p mut Package,
    slide: &'p PackURI,
}

impl<'p> SlideMedia<'p> {
    pub fn new(package: &'p mut Package, slide: &'p PackURI) -> Self {
        Self { package, slide }
    }
}

impl MediaSink for SlideMedia<'_> {
    fn embed(&mut self, data: Vec<u8>, format: ImageFormat) -> Result<String> {
        Ok(self.package.add_image(self.slide, data, format)?)
    }
}

/// Applies a [`PlaceholderTable`] to every slide of a presentation.
pub struct LayoutEngine<'a> {
    config: &'a LayoutConfig,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self { config }
    }

    /// Lay out every slide, returning how many were processed.
    ///
    /// The slide-number token is set per slide before its stages run.
    pub fn mutate_presentation(&self, package: &mut Package, table: &mut PlaceholderTable) -> Result<usize> {
        let partnames = package.slide_partnames()?;
        let mut buf = itoa::Buffer::new();
        for (index, partname) in partnames.iter().enumerate() {
            table.insert_text(keys::SLIDE_NUMBER, buf.format(index + 1));
            self.mutate_slide(package, partname, index, table)?;
        }
        info!(slides = partnames.len(), "presentation laid out");
        Ok(partnames.len())
    }

    /// Run every stage on one slide and store the result.
    ///
    /// Only unreadable slide XML is an error; stage failures are logged.
    pub fn mutate_slide(
        &self,
        package: &mut Package,
        partname: &PackURI,
        index: usize,
        table: &PlaceholderTable,
    ) -> Result<()> {
        let mut slide = package.load_slide(partname)?;
        let ctx = SlideContext::new(self.config, index);

        {
            let mut media = SlideMedia::new(package, partname);
            self.run_stages(&mut slide, table, &ctx, &mut media);
        }

        package.store_slide(partname, &slide)?;
        debug!(slide = index, partname = %partname, "slide laid out");
        Ok(())
    }

    /// The stage sequence, independent of where images end up.
    pub fn run_stages(
        &self,
        slide: &mut SlideDocument,
        table: &PlaceholderTable,
        ctx: &SlideContext,
        media: &mut dyn MediaSink,
    ) {
        let rewritten = substitute::substitute_slide(slide, table, ctx);
        debug!(slide = ctx.index, rewritten, "tokens substituted");

        run_stage("images", ctx, images::place_images(slide, table, ctx, media));
        run_stage("logos", ctx, logos::place_logos(slide, table, ctx, media));
        run_stage("grey boxes", ctx, boxes::fit_grey_boxes(slide, ctx));
        run_stage("white boxes", ctx, boxes::fit_white_boxes(slide, ctx));
        run_stage("metrics", ctx, metrics::merge_metric_labels(slide, ctx));
        if ctx.is_overview() {
            run_stage("overview", ctx, overview::arrange_overview(slide, ctx));
        }
    }
}

fn run_stage(stage: &str, ctx: &SlideContext, outcome: Result<usize>) {
    match outcome {
        Ok(changed) => debug!(slide = ctx.index, stage, changed, "layout stage done"),
        Err(e) => warn!(slide = ctx.index, stage, error = %e, "layout stage failed; continuing"),
    }
}
