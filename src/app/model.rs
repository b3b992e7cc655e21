use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use image::{DynamicImage, GenericImageView};
use ratatui::layout::Rect;
use ratatui_image::picker::{Picker, ProtocolType};
use ratatui_image::protocol::StatefulProtocol;

use crate::image::{FALLBACK_FONT_SIZE, ImageLoader};
use crate::library::{Library, LoadError, Manifest};
use crate::ui::layout;
use crate::viewer::{
    CoverSet, LensFrame, LensInput, ResponsivePolicy, Spread, ViewerState, map_lens,
    preload_indices, resolve,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Which screen is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Library,
    Viewer,
}

/// State of the library listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LibraryView {
    #[default]
    Loading,
    Ready(Library),
    /// Load failed; the listing shows the unavailability message.
    Unavailable,
}

impl LibraryView {
    pub fn library(&self) -> Option<&Library> {
        match self {
            Self::Ready(library) => Some(library),
            _ => None,
        }
    }

    pub fn book_count(&self) -> usize {
        self.library().map_or(0, |library| library.books.len())
    }
}

/// The open book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerView {
    pub book_id: String,
    /// Manifest title, or the error title when loading failed.
    pub title: String,
    pub state: ViewerState,
    pub manifest: Option<Manifest>,
    pub manifest_path: Option<PathBuf>,
    pub error: Option<LoadError>,
    pub loading: bool,
}

impl ViewerView {
    pub(super) fn opening(book_id: String, state: ViewerState) -> Self {
        Self {
            book_id,
            title: String::new(),
            state,
            manifest: None,
            manifest_path: None,
            error: None,
            loading: true,
        }
    }

    /// Path of a page reference, resolved against the manifest.
    pub fn page_path(&self, index: usize) -> Option<PathBuf> {
        let manifest = self.manifest.as_ref()?;
        let page = self.state.pages().get(index)?;
        Some(manifest.page_path(page))
    }
}

/// A terminal graphics protocol sized for one area.
pub struct PreparedImage {
    pub protocol: StatefulProtocol,
    pub cols: u16,
    pub rows: u16,
    /// Size of the area the image was fitted into.
    fitted_to: (u16, u16),
}

/// Where a page image was painted, for pointer hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBox {
    pub index: usize,
    pub rect: Rect,
}

/// Lens state for the last pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveLens {
    pub index: usize,
    pub frame: LensFrame,
    /// Pointer cell the lens follows.
    pub pointer: (u16, u16),
}

/// The complete application state.
pub struct Model {
    pub screen: Screen,
    pub library_path: PathBuf,
    pub library: LibraryView,
    /// Highlighted card in the library grid.
    pub selected_card: usize,
    pub viewer: ViewerView,
    pub covers: CoverSet,
    pub policy: ResponsivePolicy,
    pub terminal_size: (u16, u16),
    /// Double-page mode requested at startup, applied to each opened book.
    pub start_double: bool,
    pub start_magnify: bool,
    pub watch_enabled: bool,
    pub help_visible: bool,
    pub should_quit: bool,
    pub images_enabled: bool,
    pub picker: Option<Picker>,
    pub config_global_path: Option<PathBuf>,
    pub config_local_path: Option<PathBuf>,
    /// Page images by page index for the open book.
    pub page_images: HashMap<usize, PreparedImage>,
    /// Cover images by book id.
    pub cover_images: HashMap<String, PreparedImage>,
    pub lens_image: Option<((usize, (u32, u32, u32, u32)), PreparedImage)>,
    /// Painted page rectangles from the last frame.
    pub page_boxes: Vec<PageBox>,
    pub lens: Option<ActiveLens>,
    pub loader: ImageLoader,
    toast: Option<Toast>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("screen", &self.screen)
            .field("library_path", &self.library_path)
            .field("viewer", &self.viewer.book_id)
            .field("watch_enabled", &self.watch_enabled)
            .finish_non_exhaustive()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(PathBuf::from("data/books.json"), (80, 24))
    }
}

impl Model {
    pub fn new(library_path: PathBuf, terminal_size: (u16, u16)) -> Self {
        Self {
            screen: Screen::Library,
            library_path,
            library: LibraryView::Loading,
            selected_card: 0,
            viewer: ViewerView::default(),
            covers: CoverSet::default(),
            policy: ResponsivePolicy::default(),
            terminal_size,
            start_double: false,
            start_magnify: false,
            watch_enabled: false,
            help_visible: false,
            should_quit: false,
            images_enabled: true,
            picker: None,
            config_global_path: None,
            config_local_path: None,
            page_images: HashMap::new(),
            cover_images: HashMap::new(),
            lens_image: None,
            page_boxes: Vec::new(),
            lens: None,
            loader: ImageLoader::new(),
            toast: None,
        }
    }

    #[must_use]
    pub fn with_picker(mut self, picker: Option<Picker>) -> Self {
        self.picker = picker;
        self
    }

    /// Terminal area as a rect at the origin.
    pub const fn area(&self) -> Rect {
        Rect::new(0, 0, self.terminal_size.0, self.terminal_size.1)
    }

    /// Pixel size of one terminal cell.
    pub fn font_size(&self) -> (u16, u16) {
        self.picker
            .as_ref()
            .map_or(FALLBACK_FONT_SIZE, Picker::font_size)
    }

    pub fn spread(&self) -> Spread {
        resolve(&self.viewer.state, &self.covers)
    }

    /// Fresh viewer state carrying the startup mode flags.
    pub(super) fn initial_viewer_state(&self) -> ViewerState {
        ViewerState::new(Vec::new())
            .with_constrained(self.policy.is_constrained(self.terminal_size.0))
            .with_double_page(self.start_double)
            .with_magnifier(self.start_magnify)
    }

    pub(super) fn clear_page_images(&mut self) {
        self.page_images.clear();
        self.lens_image = None;
        self.page_boxes.clear();
        self.lens = None;
    }

    /// Recompute the lens for a pointer at `(col, row)`.
    pub(super) fn lens_for_pointer(&self, col: u16, row: u16) -> Option<ActiveLens> {
        if !self.viewer.state.is_magnify_enabled() {
            return None;
        }
        let (font_w, font_h) = self.font_size();
        let (fw, fh) = (f32::from(font_w.max(1)), f32::from(font_h.max(1)));
        self.page_boxes.iter().find_map(|page| {
            let rect = page.rect;
            let pointer = (
                (f32::from(col) - f32::from(rect.x) + 0.5) * fw,
                (f32::from(row) - f32::from(rect.y) + 0.5) * fh,
            );
            let rendered = (f32::from(rect.width) * fw, f32::from(rect.height) * fh);
            let lens = (f32::from(layout::LENS_COLS) * fw, f32::from(layout::LENS_ROWS) * fh);
            let frame = map_lens(LensInput::new(pointer, rendered, lens));
            frame.is_visible().then_some(ActiveLens {
                index: page.index,
                frame,
                pointer: (col, row),
            })
        })
    }

    /// Build graphics protocols for what the next frame shows and record
    /// where pages land.
    pub fn prepare_frame(&mut self) {
        let _scope = crate::logging::scope("frame.prepare");
        match self.screen {
            Screen::Library => self.prepare_covers(),
            Screen::Viewer => {
                self.prepare_pages();
                self.prepare_lens();
            }
        }
    }

    fn use_halfblocks(&self) -> bool {
        self.picker
            .as_ref()
            .is_some_and(|picker| matches!(picker.protocol_type(), ProtocolType::Halfblocks))
    }

    fn prepare_pages(&mut self) {
        let regions = layout::viewer_regions(self.area());
        let spread = self.spread();
        let areas = layout::page_areas(regions.pages, spread.len());
        let halfblocks = self.use_halfblocks();
        let mut boxes = Vec::with_capacity(spread.len());

        for (slot, area) in spread.slots.iter().zip(areas) {
            let stale = self
                .page_images
                .get(&slot.index)
                .is_none_or(|img| img.fitted_to != (area.width, area.height));
            if stale && self.images_enabled {
                self.page_images.remove(&slot.index);
                if let (Some(picker), Some(path)) =
                    (self.picker.as_ref(), self.viewer.page_path(slot.index))
                    && let Some(source) = self.loader.load(&path)
                    && let Some(prepared) = prepare_image(picker, &source, area, halfblocks)
                {
                    tracing::trace!(
                        target: "folio::render",
                        index = slot.index,
                        cols = prepared.cols,
                        rows = prepared.rows,
                        "page protocol built"
                    );
                    self.page_images.insert(slot.index, prepared);
                }
            }
            if let Some(img) = self.page_images.get(&slot.index) {
                boxes.push(PageBox {
                    index: slot.index,
                    rect: layout::centered(area, img.cols, img.rows),
                });
            }
        }

        let visible = spread.indices();
        self.page_images.retain(|index, _| visible.contains(index));
        self.page_boxes = boxes;
    }

    fn prepare_lens(&mut self) {
        let Some(lens) = self.lens else {
            self.lens_image = None;
            return;
        };
        let (Some(picker), Some(path)) = (self.picker.as_ref(), self.viewer.page_path(lens.index))
        else {
            return;
        };
        let Some(source) = self.loader.load(&path) else {
            return;
        };
        let Some(crop) = lens.frame.source_crop(source.dimensions()) else {
            self.lens_image = None;
            return;
        };
        let key = (lens.index, crop);
        if self.lens_image.as_ref().is_some_and(|(k, _)| *k == key) {
            return;
        }
        let (x, y, w, h) = crop;
        let region = source.crop_imm(x, y, w, h);
        let bounds = layout::viewer_regions(self.area()).pages;
        let area = layout::lens_rect(bounds, lens.pointer.0, lens.pointer.1);
        let halfblocks = self.use_halfblocks();
        self.lens_image =
            prepare_image(picker, &region, area, halfblocks).map(|prepared| (key, prepared));
    }

    fn prepare_covers(&mut self) {
        if !self.images_enabled {
            return;
        }
        let Some(library) = self.library.library() else {
            return;
        };
        let (_, grid, _) = layout::library_regions(self.area());
        let halfblocks = self.use_halfblocks();
        let Some(picker) = self.picker.as_ref() else {
            return;
        };
        for (index, card) in layout::card_grid(grid, library.books.len(), self.selected_card) {
            let book = &library.books[index];
            let area = cover_area(card);
            let fresh = self
                .cover_images
                .get(&book.id)
                .is_some_and(|img| img.fitted_to == (area.width, area.height));
            if fresh {
                continue;
            }
            let Some(path) = library.cover_path(book) else {
                continue;
            };
            if let Some(source) = self.loader.load(&path)
                && let Some(prepared) = prepare_image(picker, &source, area, halfblocks)
            {
                self.cover_images.insert(book.id.clone(), prepared);
            }
        }
    }

    /// Warm the image cache with the pages around the current spread.
    pub fn prefetch_neighbors(&self) {
        if !self.images_enabled || self.screen != Screen::Viewer {
            return;
        }
        let paths = preload_indices(&self.viewer.state)
            .into_iter()
            .filter_map(|index| self.viewer.page_path(index))
            .collect();
        self.loader.prefetch(paths);
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

/// Inner cover area of a library card: inside the border, above the title row.
pub fn cover_area(card: Rect) -> Rect {
    Rect::new(
        card.x + 1,
        card.y + 1,
        card.width.saturating_sub(2),
        card.height.saturating_sub(3),
    )
}

fn prepare_image(
    picker: &Picker,
    source: &DynamicImage,
    area: Rect,
    halfblocks: bool,
) -> Option<PreparedImage> {
    let (scaled, cols, rows) =
        crate::image::fit_to_cells(source, area, picker.font_size(), halfblocks)?;
    let scaled = if halfblocks && !crate::image::supports_truecolor_terminal() {
        crate::image::quantize_to_ansi256(&scaled)
    } else {
        scaled
    };
    Some(PreparedImage {
        protocol: picker.new_resize_protocol(scaled),
        cols,
        rows,
        fitted_to: (area.width, area.height),
    })
}
