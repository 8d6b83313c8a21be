//! Canvas-backed bitmaps and drawing primitives.
//!
//! Every primitive is a direct call into `CanvasRenderingContext2d`; colors
//! are packed `0xAARRGGBB` and angles are degrees, anticlockwise on screen.

use webgro_core::color::{makecol, Color};
use webgro_core::math::{rad, scaleclamp};

/// Stroke width in pixels; zero or negative means one.
pub fn line_width(width: f64) -> f64 {
    if width > 0.0 {
        width
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Rectangle spanning two corners given in any order.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x: x1.min(x2),
            y: y1.min(y2),
            w: (x2 - x1).abs(),
            h: (y2 - y1).abs(),
        }
    }

    /// Band `width` pixels tall standing in for a horizontal line.
    pub fn hline(x1: f64, y: f64, x2: f64, width: f64) -> Self {
        Self {
            h: line_width(width),
            ..Self::from_corners(x1, y, x2, y)
        }
    }

    /// Band `width` pixels wide standing in for a vertical line.
    pub fn vline(x: f64, y1: f64, y2: f64, width: f64) -> Self {
        Self {
            w: line_width(width),
            ..Self::from_corners(x, y1, x, y2)
        }
    }
}

/// The first `vertices` points of a flat `[x1, y1, x2, y2, ...]` list. A
/// trailing odd coordinate is ignored.
pub fn polygon_vertices(vertices: usize, points: &[f64]) -> Vec<(f64, f64)> {
    points
        .chunks_exact(2)
        .take(vertices)
        .map(|p| (p[0], p[1]))
        .collect()
}

/// Canvas start and end angles of an arc running anticlockwise on screen
/// from `ang1` to `ang2` degrees. Trace it with `anticlockwise` set.
pub fn arc_span(ang1: f64, ang2: f64) -> (f64, f64) {
    (rad(ang1), rad(ang2))
}

/// Destination of a `w`x`h` sprite once the target has been translated to
/// the pivot and rotated: pivot (cx, cy) in sprite pixels, scaled by `scale`.
pub fn pivot_placement(w: f64, h: f64, cx: f64, cy: f64, scale: f64) -> Rect {
    Rect {
        x: -scale * cx,
        y: -scale * cy,
        w: w * scale,
        h: h * scale,
    }
}

/// The default loading bar: three nested frames along the bottom of the
/// screen and a fill scaled to `progress`.
pub fn loading_bar_rects(width: f64, height: f64, progress: f64) -> [(Rect, Color); 4] {
    let black = makecol(0, 0, 0);
    let white = makecol(255, 255, 255);
    let frame = |inset: f64, h: f64| Rect {
        x: inset,
        y: height - 55.0 + (inset - 5.0),
        w: width - 2.0 * inset,
        h,
    };
    let mut fill = frame(20.0, 20.0);
    fill.w = scaleclamp(progress, 0.0, 1.0, 0.0, width - 40.0);
    [
        (frame(5.0, 50.0), black),
        (frame(10.0, 40.0), white),
        (frame(15.0, 30.0), black),
        (fill, white),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Centre,
    Right,
}

impl TextAlign {
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Centre => "center",
            Self::Right => "right",
        }
    }
}

/// CSS font shorthand for a pixel size and family.
pub fn font_spec(size: f64, family: &str) -> String {
    format!("{}px {family}", size.round())
}

/// Text outline color and stroke width. No color, or 0, draws none.
pub fn text_outline(outline: Option<u32>, width: Option<f64>) -> Option<(Color, f64)> {
    outline
        .filter(|&c| c != 0)
        .map(|c| (Color(c), line_width(width.unwrap_or(1.0))))
}

/// A font file registered with the page under a generated family name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    pub name: String,
    pub file: String,
}

impl FontFace {
    /// The `index`-th registered face, named `font{index}`.
    pub fn numbered(index: u32, file: &str) -> Self {
        Self {
            name: format!("font{index}"),
            file: file.to_string(),
        }
    }

    /// The `@font-face` rule that makes `name` resolve to `file`.
    pub fn css(&self) -> String {
        let url = self.file.replace('\\', "\\\\").replace('\'', "\\'");
        format!("@font-face {{ font-family: {}; src: url('{url}'); }}", self.name)
    }
}

#[cfg(target_arch = "wasm32")]
pub use canvas::{load_bitmap, load_font, Bitmap, Font};

#[cfg(target_arch = "wasm32")]
mod canvas {
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, HtmlImageElement};

    use webgro_core::color::Color;
    use webgro_core::math::rad;
    use webgro_core::{Error, LoadHandle, PendingLoads, Result};

    use super::{
        arc_span, font_spec, line_width, loading_bar_rects, pivot_placement, polygon_vertices,
        text_outline, FontFace, Rect, TextAlign,
    };
    use crate::host::{self, js_error};

    /// A font usable by the `textout` family.
    #[wasm_bindgen]
    #[derive(Clone)]
    pub struct Font {
        family: String,
        file: Option<String>,
        rule: Option<Element>,
    }

    #[wasm_bindgen]
    impl Font {
        /// A family the page already knows, such as `monospace` or a web font.
        pub fn from_family(family: String) -> Font {
            Font {
                family,
                file: None,
                rule: None,
            }
        }

        pub fn name(&self) -> String {
            self.family.clone()
        }

        /// URL of the font file, if this font was loaded from one.
        pub fn file(&self) -> Option<String> {
            self.file.clone()
        }

        /// Remove the `@font-face` rule from the page.
        pub fn unload(&mut self) {
            if let Some(rule) = self.rule.take() {
                rule.remove();
            }
        }
    }

    /// Register `url` as the `index`-th page font through an `@font-face`
    /// rule in the document head.
    pub fn load_font(url: &str, index: u32) -> Result<Font> {
        let face = FontFace::numbered(index, url);
        let document = host::document()?;
        let head = document
            .head()
            .ok_or_else(|| Error::Host("document has no head".into()))?;
        let rule = document.create_element("style").map_err(host::host_error)?;
        rule.set_id(&face.name);
        rule.set_text_content(Some(&face.css()));
        head.append_child(&rule).map_err(host::host_error)?;
        log::info!("Font {url} registered as {}", face.name);
        Ok(Font {
            family: face.name,
            file: Some(face.file),
            rule: Some(rule),
        })
    }

    fn context_2d(canvas: &HtmlCanvasElement, id: &str) -> Result<CanvasRenderingContext2d> {
        canvas
            .get_context("2d")
            .map_err(host::host_error)?
            .ok_or_else(|| Error::ContextUnavailable(id.to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| Error::ContextUnavailable(id.to_string()))
    }

    /// A drawing surface: the screen canvas or an offscreen one.
    #[wasm_bindgen]
    #[derive(Clone)]
    pub struct Bitmap {
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        load: Option<LoadHandle>,
    }

    impl Bitmap {
        /// Resolve the on-page canvas `canvas_id` and size it.
        pub fn attach(canvas_id: &str, width: u32, height: u32) -> Result<Self> {
            let canvas = host::document()?
                .get_element_by_id(canvas_id)
                .ok_or_else(|| Error::ElementNotFound(canvas_id.to_string()))?
                .dyn_into::<HtmlCanvasElement>()
                .map_err(|_| Error::NotACanvas(canvas_id.to_string()))?;
            canvas.set_width(width);
            canvas.set_height(height);
            let ctx = context_2d(&canvas, canvas_id)?;
            Ok(Self {
                canvas,
                ctx,
                load: None,
            })
        }

        /// Offscreen bitmap.
        pub fn create(width: u32, height: u32) -> Result<Self> {
            let canvas = host::document()?
                .create_element("canvas")
                .map_err(host::host_error)?
                .dyn_into::<HtmlCanvasElement>()
                .map_err(|_| Error::NotACanvas("offscreen".into()))?;
            canvas.set_width(width);
            canvas.set_height(height);
            let ctx = context_2d(&canvas, "offscreen")?;
            Ok(Self {
                canvas,
                ctx,
                load: None,
            })
        }

        pub fn element(&self) -> &HtmlCanvasElement {
            &self.canvas
        }

        fn fill_style(&self, color: Color) {
            self.ctx.set_fill_style_str(&color.to_css());
        }

        fn stroke_style(&self, color: Color, width: f64) {
            self.ctx.set_line_width(line_width(width));
            self.ctx.set_stroke_style_str(&color.to_css());
        }

        fn fill_rect(&self, r: Rect, color: Color) {
            self.fill_style(color);
            self.ctx.fill_rect(r.x, r.y, r.w, r.h);
        }

        fn arc_path(&self, x: f64, y: f64, radius: f64) {
            self.ctx.begin_path();
            let _ = self.ctx.arc(x, y, radius, 0.0, std::f64::consts::TAU);
        }

        fn closed_path(&self, vertices: &[(f64, f64)]) {
            self.ctx.begin_path();
            for (i, &(x, y)) in vertices.iter().enumerate() {
                if i == 0 {
                    self.ctx.move_to(x, y);
                } else {
                    self.ctx.line_to(x, y);
                }
            }
            self.ctx.close_path();
        }

        fn span_path(&self, x: f64, y: f64, ang1: f64, ang2: f64, radius: f64) {
            let (start, end) = arc_span(ang1, ang2);
            self.ctx.begin_path();
            let _ = self
                .ctx
                .arc_with_anticlockwise(x, y, radius, start, end, true);
        }

        /// Draw `sprite` with its pivot (cx, cy) at (x, y), rotated by
        /// `angle` degrees and scaled by `scale`.
        #[allow(clippy::too_many_arguments)]
        fn draw_pivoted(&self, sprite: &Bitmap, x: f64, y: f64, cx: f64, cy: f64, angle: f64, scale: f64) {
            let (w, h) = (f64::from(sprite.w()), f64::from(sprite.h()));
            let dest = pivot_placement(w, h, cx, cy, scale);
            self.ctx.save();
            let _ = self.ctx.translate(x, y);
            let _ = self.ctx.rotate(rad(angle));
            let _ = self
                .ctx
                .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    &sprite.canvas,
                    0.0,
                    0.0,
                    w,
                    h,
                    dest.x,
                    dest.y,
                    dest.w,
                    dest.h,
                );
            self.ctx.restore();
        }

        /// Draw the default loading bar for `progress` in 0.0..=1.0.
        pub fn draw_loading_bar(&self, progress: f64) {
            let (w, h) = (f64::from(self.w()), f64::from(self.h()));
            for (rect, color) in loading_bar_rects(w, h, progress) {
                self.fill_rect(rect, color);
            }
        }

        /// Fill `text`, then stroke it when an outline is given.
        #[allow(clippy::too_many_arguments)]
        pub fn draw_text(
            &self,
            text: &str,
            x: f64,
            y: f64,
            size: f64,
            color: Color,
            family: &str,
            align: TextAlign,
            outline: Option<(Color, f64)>,
        ) {
            self.ctx.set_font(&font_spec(size, family));
            self.ctx.set_text_align(align.as_css());
            self.fill_style(color);
            let _ = self.ctx.fill_text(text, x, y);
            if let Some((stroke, width)) = outline {
                self.stroke_style(stroke, width);
                let _ = self.ctx.stroke_text(text, x, y);
            }
        }
    }

    #[wasm_bindgen]
    impl Bitmap {
        pub fn w(&self) -> u32 {
            self.canvas.width()
        }

        pub fn h(&self) -> u32 {
            self.canvas.height()
        }

        /// False until a loaded image has arrived. Created bitmaps are always ready.
        pub fn ready(&self) -> bool {
            self.load.as_ref().map_or(true, LoadHandle::is_ready)
        }

        pub fn clear_to_color(&self, color: u32) {
            let (w, h) = (f64::from(self.w()), f64::from(self.h()));
            self.fill_rect(Rect { x: 0.0, y: 0.0, w, h }, Color(color));
        }

        /// Clear to transparent black.
        pub fn clear_bitmap(&self) {
            let (w, h) = (f64::from(self.w()), f64::from(self.h()));
            self.ctx.clear_rect(0.0, 0.0, w, h);
        }

        pub fn putpixel(&self, x: f64, y: f64, color: u32) {
            self.fill_rect(Rect { x, y, w: 1.0, h: 1.0 }, Color(color));
        }

        /// Slow: reads back through `getImageData`.
        pub fn getpixel(&self, x: f64, y: f64) -> std::result::Result<u32, JsValue> {
            let data = self.ctx.get_image_data(x, y, 1.0, 1.0)?.data();
            match data.0.as_slice() {
                [r, g, b, a, ..] => Ok(Color::from_rgba_bytes([*r, *g, *b, *a]).0),
                _ => Err(js_error(Error::Host("empty pixel read".into()))),
            }
        }

        pub fn line(&self, x1: f64, y1: f64, x2: f64, y2: f64, color: u32, width: f64) {
            self.stroke_style(Color(color), width);
            self.ctx.begin_path();
            self.ctx.move_to(x1, y1);
            self.ctx.line_to(x2, y2);
            self.ctx.stroke();
        }

        /// Outline between two corners.
        pub fn rect(&self, x1: f64, y1: f64, x2: f64, y2: f64, color: u32, width: f64) {
            let r = Rect::from_corners(x1, y1, x2, y2);
            self.stroke_style(Color(color), width);
            self.ctx.stroke_rect(r.x, r.y, r.w, r.h);
        }

        pub fn rectfill(&self, x1: f64, y1: f64, x2: f64, y2: f64, color: u32) {
            self.fill_rect(Rect::from_corners(x1, y1, x2, y2), Color(color));
        }

        /// Vertical line drawn as a `width`-pixel band.
        pub fn vline(&self, x: f64, y1: f64, y2: f64, color: u32, width: f64) {
            self.fill_rect(Rect::vline(x, y1, y2, width), Color(color));
        }

        /// Horizontal line drawn as a `width`-pixel band.
        pub fn hline(&self, x1: f64, y: f64, x2: f64, color: u32, width: f64) {
            self.fill_rect(Rect::hline(x1, y, x2, width), Color(color));
        }

        #[allow(clippy::too_many_arguments)]
        pub fn triangle(&self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64, color: u32, width: f64) {
            self.stroke_style(Color(color), width);
            self.closed_path(&[(x1, y1), (x2, y2), (x3, y3)]);
            self.ctx.stroke();
        }

        #[allow(clippy::too_many_arguments)]
        pub fn trianglefill(&self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64, color: u32) {
            self.fill_style(Color(color));
            self.closed_path(&[(x1, y1), (x2, y2), (x3, y3)]);
            self.ctx.fill();
        }

        /// Outline through the first `vertices` points of `[x1, y1, x2, y2, ...]`.
        pub fn polygon(&self, vertices: u32, points: &[f64], color: u32, width: f64) {
            self.stroke_style(Color(color), width);
            self.closed_path(&polygon_vertices(vertices as usize, points));
            self.ctx.stroke();
        }

        pub fn polygonfill(&self, vertices: u32, points: &[f64], color: u32) {
            self.fill_style(Color(color));
            self.closed_path(&polygon_vertices(vertices as usize, points));
            self.ctx.fill();
        }

        /// Arc from `ang1` to `ang2` degrees, anticlockwise on screen.
        #[allow(clippy::too_many_arguments)]
        pub fn arc(&self, x: f64, y: f64, ang1: f64, ang2: f64, radius: f64, color: u32, width: f64) {
            self.stroke_style(Color(color), width);
            self.span_path(x, y, ang1, ang2, radius);
            self.ctx.stroke();
        }

        /// Filled arc segment, closed by the chord between its ends.
        #[allow(clippy::too_many_arguments)]
        pub fn arcfill(&self, x: f64, y: f64, ang1: f64, ang2: f64, radius: f64, color: u32) {
            self.fill_style(Color(color));
            self.span_path(x, y, ang1, ang2, radius);
            self.ctx.fill();
        }

        pub fn circle(&self, x: f64, y: f64, radius: f64, color: u32, width: f64) {
            self.stroke_style(Color(color), width);
            self.arc_path(x, y, radius);
            self.ctx.stroke();
        }

        pub fn circlefill(&self, x: f64, y: f64, radius: f64, color: u32) {
            self.fill_style(Color(color));
            self.arc_path(x, y, radius);
            self.ctx.fill();
        }

        pub fn draw_sprite(&self, sprite: &Bitmap, x: f64, y: f64) {
            let _ = self
                .ctx
                .draw_image_with_html_canvas_element(&sprite.canvas, x, y);
        }

        pub fn stretch_sprite(&self, sprite: &Bitmap, x: f64, y: f64, w: f64, h: f64) {
            let _ = self
                .ctx
                .draw_image_with_html_canvas_element_and_dw_and_dh(&sprite.canvas, x, y, w, h);
        }

        /// Draw `sprite` centred on (x, y), rotated by `angle` degrees.
        pub fn rotate_sprite(&self, sprite: &Bitmap, x: f64, y: f64, angle: f64) {
            self.rotate_scaled_sprite(sprite, x, y, angle, 1.0);
        }

        /// Draw `sprite` with its point (cx, cy) on (x, y), rotated around it.
        #[allow(clippy::too_many_arguments)]
        pub fn pivot_sprite(&self, sprite: &Bitmap, x: f64, y: f64, cx: f64, cy: f64, angle: f64) {
            self.draw_pivoted(sprite, x, y, cx, cy, angle, 1.0);
        }

        /// Like [`Bitmap::rotate_sprite`]; `scale` 1.0 is unscaled.
        pub fn rotate_scaled_sprite(&self, sprite: &Bitmap, x: f64, y: f64, angle: f64, scale: f64) {
            let (cx, cy) = (f64::from(sprite.w()) / 2.0, f64::from(sprite.h()) / 2.0);
            self.draw_pivoted(sprite, x, y, cx, cy, angle, scale);
        }

        #[allow(clippy::too_many_arguments)]
        pub fn pivot_scaled_sprite(
            &self,
            sprite: &Bitmap,
            x: f64,
            y: f64,
            cx: f64,
            cy: f64,
            angle: f64,
            scale: f64,
        ) {
            self.draw_pivoted(sprite, x, y, cx, cy, angle, scale);
        }

        /// Copy a `w`x`h` block of `source` at (sx, sy) onto this bitmap at (dx, dy).
        #[allow(clippy::too_many_arguments)]
        pub fn blit(&self, source: &Bitmap, sx: f64, sy: f64, dx: f64, dy: f64, w: f64, h: f64) {
            self.stretch_blit(source, sx, sy, w, h, dx, dy, w, h);
        }

        #[allow(clippy::too_many_arguments)]
        pub fn stretch_blit(
            &self,
            source: &Bitmap,
            sx: f64,
            sy: f64,
            sw: f64,
            sh: f64,
            dx: f64,
            dy: f64,
            dw: f64,
            dh: f64,
        ) {
            let _ = self
                .ctx
                .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    &source.canvas,
                    sx,
                    sy,
                    sw,
                    sh,
                    dx,
                    dy,
                    dw,
                    dh,
                );
        }

        /// Text at (x, y) in `font`, `size` pixels high. A non-zero `outline`
        /// color strokes the glyphs `width` pixels wide.
        #[allow(clippy::too_many_arguments)]
        pub fn textout(
            &self,
            font: &Font,
            text: &str,
            x: f64,
            y: f64,
            size: f64,
            color: u32,
            outline: Option<u32>,
            width: Option<f64>,
        ) {
            let outline = text_outline(outline, width);
            self.draw_text(text, x, y, size, Color(color), &font.family, TextAlign::Left, outline);
        }

        #[allow(clippy::too_many_arguments)]
        pub fn textout_centre(
            &self,
            font: &Font,
            text: &str,
            x: f64,
            y: f64,
            size: f64,
            color: u32,
            outline: Option<u32>,
            width: Option<f64>,
        ) {
            let outline = text_outline(outline, width);
            self.draw_text(text, x, y, size, Color(color), &font.family, TextAlign::Centre, outline);
        }

        #[allow(clippy::too_many_arguments)]
        pub fn textout_right(
            &self,
            font: &Font,
            text: &str,
            x: f64,
            y: f64,
            size: f64,
            color: u32,
            outline: Option<u32>,
            width: Option<f64>,
        ) {
            let outline = text_outline(outline, width);
            self.draw_text(text, x, y, size, Color(color), &font.family, TextAlign::Right, outline);
        }
    }

    /// Start loading `url` into a new bitmap. The bitmap is registered in
    /// `loads` and sized once the image arrives.
    pub fn load_bitmap(url: &str, loads: &PendingLoads) -> Result<Bitmap> {
        log::info!("Loading bitmap {url}...");
        let mut bitmap = Bitmap::create(0, 0)?;
        let handle = loads.track(url);
        bitmap.load = Some(handle.clone());

        let image = HtmlImageElement::new().map_err(host::host_error)?;
        let (canvas, ctx, img, name) = (
            bitmap.canvas.clone(),
            bitmap.ctx.clone(),
            image.clone(),
            url.to_string(),
        );
        let on_load = Closure::once_into_js(move || {
            let (w, h) = (img.natural_width(), img.natural_height());
            canvas.set_width(w);
            canvas.set_height(h);
            let _ = ctx.draw_image_with_html_image_element(&img, 0.0, 0.0);
            handle.mark_ready();
            log::info!("Bitmap {name} loaded, size: {w} x {h}");
        });
        image.set_onload(Some(on_load.unchecked_ref()));
        image.set_src(url);
        Ok(bitmap)
    }
}
