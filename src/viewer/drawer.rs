//! Detail drawer state: the selected point, its article and the gallery lightbox

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;

use crate::content::loader::{ContentLoader, PointContent};
use crate::input::events::{EventHandled, KeyCode};
use crate::registry::point::{PointLink, PointOfInterest};

/// Article state of the selected point
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ContentState {
    /// The point has no article
    #[default]
    None,
    Loading,
    Ready(Arc<PointContent>),
    /// Fetch failed; the drawer says so
    Unavailable,
}

impl ContentState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ContentState::Loading)
    }
}

/// Full-screen gallery viewer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lightbox {
    open: bool,
    index: usize,
    len: usize,
}

impl Lightbox {
    /// Opens on image `index` of a gallery of `len`; ignored for an empty gallery
    pub fn open_at(&mut self, index: usize, len: usize) {
        if len == 0 {
            return;
        }
        self.open = true;
        self.len = len;
        self.index = index.min(len - 1);
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn previous(&mut self) -> bool {
        if !self.open || self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn next(&mut self) -> bool {
        if !self.open || self.index + 1 >= self.len {
            return false;
        }
        self.index += 1;
        true
    }

    /// "3/7"
    pub fn counter(&self) -> String {
        format!("{}/{}", self.index + 1, self.len)
    }
}

/// One visible block of the drawer; empty sections are never produced
#[derive(Debug, Clone, PartialEq)]
pub enum DrawerSection {
    MainImage(String),
    Gallery(Vec<String>),
    Address(String),
    Coordinates(String),
    Links(Vec<PointLink>),
    Article(ContentState),
}

/// Slide-in panel with the selected point.
///
/// Every article request is numbered; only the latest one may fill the
/// drawer, so a slow fetch for a point the user has already left is dropped.
#[derive(Debug, Clone, Default)]
pub struct Drawer {
    selected: Option<PointOfInterest>,
    open: bool,
    content: ContentState,
    lightbox: Lightbox,
    ticket: u64,
    show_coordinates: bool,
}

impl Drawer {
    pub fn new() -> Self {
        Self {
            show_coordinates: true,
            ..Self::default()
        }
    }

    /// Drawer for points without meaningful coordinates (the SVG canvas)
    pub fn without_coordinates() -> Self {
        Self::default()
    }

    /// Selects and opens. Returns the ticket of the article request to
    /// issue, or `None` when the point has no article.
    pub fn select(&mut self, point: PointOfInterest) -> Option<u64> {
        self.open = true;
        self.lightbox = Lightbox::default();
        self.ticket += 1;

        let wants_content = point.has_content();
        self.selected = Some(point);
        if wants_content {
            self.content = ContentState::Loading;
            Some(self.ticket)
        } else {
            self.content = ContentState::None;
            None
        }
    }

    /// Applies a finished request; stale tickets are ignored.
    /// Returns whether the drawer changed.
    pub fn resolve(&mut self, ticket: u64, content: Option<Arc<PointContent>>) -> bool {
        if ticket != self.ticket || !self.content.is_loading() {
            log::debug!("dropping stale content (ticket {}, current {})", ticket, self.ticket);
            return false;
        }
        self.content = match content {
            Some(content) => ContentState::Ready(content),
            None => ContentState::Unavailable,
        };
        true
    }

    pub fn close(&mut self) {
        self.open = false;
        self.lightbox.close();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected(&self) -> Option<&PointOfInterest> {
        self.selected.as_ref()
    }

    pub fn content(&self) -> &ContentState {
        &self.content
    }

    pub fn is_loading(&self) -> bool {
        self.content.is_loading()
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn open_lightbox(&mut self, index: usize) {
        let len = self.selected.as_ref().map_or(0, |p| p.gallery.len());
        self.lightbox.open_at(index, len);
    }

    pub fn close_lightbox(&mut self) {
        self.lightbox.close();
    }

    /// Gallery image shown in the lightbox
    pub fn lightbox_image(&self) -> Option<&str> {
        if !self.lightbox.is_open() {
            return None;
        }
        self.selected
            .as_ref()?
            .gallery
            .get(self.lightbox.index())
            .map(String::as_str)
    }

    /// Escape closes the lightbox first, then the drawer; arrows page the lightbox
    pub fn handle_key(&mut self, key: KeyCode) -> EventHandled {
        match key {
            KeyCode::Escape if self.lightbox.is_open() => self.lightbox.close(),
            KeyCode::Escape if self.open => self.close(),
            KeyCode::ArrowLeft if self.lightbox.is_open() => {
                self.lightbox.previous();
            }
            KeyCode::ArrowRight if self.lightbox.is_open() => {
                self.lightbox.next();
            }
            _ => return EventHandled::NotHandled,
        }
        EventHandled::Handled
    }

    pub fn sections(&self) -> Vec<DrawerSection> {
        let Some(point) = &self.selected else {
            return Vec::new();
        };
        let mut sections = Vec::new();

        if let Some(image) = point.image.as_ref().filter(|i| !i.is_empty()) {
            sections.push(DrawerSection::MainImage(image.clone()));
        }
        if !point.gallery.is_empty() {
            sections.push(DrawerSection::Gallery(point.gallery.clone()));
        }
        if let Some(address) = point.address.as_ref().filter(|a| !a.is_empty()) {
            sections.push(DrawerSection::Address(address.clone()));
        }
        if self.show_coordinates {
            sections.push(DrawerSection::Coordinates(point.coordinates_label()));
        }
        if !point.links.is_empty() {
            sections.push(DrawerSection::Links(point.links.clone()));
        }
        if point.has_content() {
            sections.push(DrawerSection::Article(self.content.clone()));
        }
        sections
    }
}

/// A finished article request
#[derive(Debug)]
pub struct ContentResponse {
    pub ticket: u64,
    pub content: Option<Arc<PointContent>>,
}

/// Sends exactly one response per request
struct Reply {
    ticket: u64,
    tx: Option<Sender<ContentResponse>>,
}

impl Reply {
    fn send(&mut self, content: Option<Arc<PointContent>>) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(ContentResponse {
                ticket: self.ticket,
                content,
            });
        }
    }
}

impl Drop for Reply {
    fn drop(&mut self) {
        if self.tx.is_some() {
            log::warn!("content request {} ended without a result", self.ticket);
            self.send(None);
        }
    }
}

/// Runs article requests in the background and hands results back to the UI thread
pub struct ContentRequests {
    loader: ContentLoader,
    tx: Sender<ContentResponse>,
    rx: Receiver<ContentResponse>,
}

impl ContentRequests {
    pub fn new(loader: ContentLoader) -> Self {
        let (tx, rx) = unbounded();
        Self { loader, tx, rx }
    }

    pub fn loader(&self) -> &ContentLoader {
        &self.loader
    }

    pub fn request(&self, ticket: u64, point: PointOfInterest) {
        crate::runtime::spawn(self.task(ticket, point));
    }

    /// The request future. It always answers: a task that panics or is
    /// dropped unfinished reports the article as unavailable.
    fn task(&self, ticket: u64, point: PointOfInterest) -> impl std::future::Future<Output = ()> + Send + 'static {
        let loader = self.loader.clone();
        let mut reply = Reply {
            ticket,
            tx: Some(self.tx.clone()),
        };
        async move {
            let content = loader.load(&point).await;
            reply.send(content);
        }
    }

    /// Applies everything that finished since the last call
    pub fn poll_into(&self, drawer: &mut Drawer) -> bool {
        let mut changed = false;
        while let Ok(response) = self.rx.try_recv() {
            changed |= drawer.resolve(response.ticket, response.content);
        }
        changed
    }
}
