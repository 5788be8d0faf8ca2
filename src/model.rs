//! Gallery data shown by the grid and the lightbox.
//! Records come from a bundled manifest; editing lives outside this app.

use serde::{Deserialize, Serialize};
use std::rc::Rc;
use yew::Reducible;

use crate::error::RefreshError;

const MANIFEST: &str = include_str!("../assets/photos.json");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub title: String,
    pub url: String,
    /// Smaller rendition for the grid; falls back to `url`.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub category: String,
}

impl Photo {
    pub fn thumbnail(&self) -> &str {
        self.thumbnail_url.as_deref().unwrap_or(&self.url)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub categories: Vec<Category>,
    pub photos: Vec<Photo>,
}

impl Manifest {
    pub fn parse(raw: &str) -> Result<Self, RefreshError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn bundled() -> Result<Self, RefreshError> {
        Self::parse(MANIFEST)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GalleryState {
    pub categories: Vec<Category>,
    pub photos: Vec<Photo>,
    /// `None` shows every category.
    pub active_category: Option<String>,
    /// Index into [`GalleryState::visible`] of the photo open in the lightbox.
    pub open: Option<usize>,
    /// Bumped on every manifest load.
    pub version: u64,
}

impl GalleryState {
    pub fn from_manifest(m: Manifest) -> Self {
        Self {
            categories: m.categories,
            photos: m.photos,
            ..Default::default()
        }
    }

    pub fn visible(&self) -> Vec<&Photo> {
        self.photos
            .iter()
            .filter(|p| match &self.active_category {
                Some(c) => &p.category == c,
                None => true,
            })
            .collect()
    }

    pub fn open_photo(&self) -> Option<&Photo> {
        self.open.and_then(|i| self.visible().get(i).copied())
    }

    /// Filter order used for swipe navigation: "all" first, then categories.
    fn filter_cycle(&self) -> Vec<Option<String>> {
        std::iter::once(None)
            .chain(self.categories.iter().map(|c| Some(c.id.clone())))
            .collect()
    }

    fn step_category(&self, forward: bool) -> Option<String> {
        let cycle = self.filter_cycle();
        let pos = cycle
            .iter()
            .position(|c| *c == self.active_category)
            .unwrap_or(0);
        let next = if forward {
            (pos + 1) % cycle.len()
        } else {
            (pos + cycle.len() - 1) % cycle.len()
        };
        cycle[next].clone()
    }
}

pub enum GalleryAction {
    Loaded(Manifest),
    SelectCategory(Option<String>),
    NextCategory,
    PrevCategory,
    Open(usize),
    Next,
    Prev,
    Close,
}

impl Reducible for GalleryState {
    type Action = GalleryAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use GalleryAction::*;
        let mut new = (*self).clone();
        match action {
            Loaded(m) => {
                new.categories = m.categories;
                new.photos = m.photos;
                new.version = new.version.wrapping_add(1);
                if let Some(c) = &new.active_category {
                    if !new.categories.iter().any(|k| &k.id == c) {
                        new.active_category = None;
                    }
                }
                let len = new.visible().len();
                new.open = new.open.filter(|i| *i < len);
            }
            SelectCategory(c) => {
                if new.active_category == c {
                    return self;
                }
                new.active_category = c;
                new.open = None;
            }
            NextCategory => {
                new.active_category = new.step_category(true);
                new.open = None;
            }
            PrevCategory => {
                new.active_category = new.step_category(false);
                new.open = None;
            }
            Open(i) => {
                if i >= new.visible().len() {
                    return self;
                }
                new.open = Some(i);
            }
            Next => {
                let len = new.visible().len();
                match new.open {
                    Some(i) if i + 1 < len => new.open = Some(i + 1),
                    _ => return self,
                }
            }
            Prev => match new.open {
                Some(i) if i > 0 => new.open = Some(i - 1),
                _ => return self,
            },
            Close => {
                if new.open.is_none() {
                    return self;
                }
                new.open = None;
            }
        }
        Rc::new(new)
    }
}
