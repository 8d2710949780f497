use super::filters::{FilterCriteria, PageQuery};
use super::types::{FavoriteEntry, FavoritePage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub ticket: u64,
    pub generation: u64,
    pub page_index: u32,
    pub reset: bool,
    pub query: PageQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Replaced(usize),
    Appended(usize),
    Failed,
    Stale,
}

#[derive(Debug, Clone)]
pub struct ListState {
    favorites: Vec<FavoriteEntry>,
    filters: FilterCriteria,
    page_index: u32,
    page_size: u32,
    has_more: bool,
    fetching: bool,
    // Rows belong to criteria whose reload failed.
    rows_outdated: bool,
    generation: u64,
    next_ticket: u64,
    latest_ticket: u64,
}

impl ListState {
    pub fn new(page_size: u32) -> Self {
        Self {
            favorites: Vec::new(),
            filters: FilterCriteria::default(),
            page_index: 0,
            page_size: page_size.max(1),
            has_more: true,
            fetching: false,
            rows_outdated: false,
            generation: 0,
            next_ticket: 0,
            latest_ticket: 0,
        }
    }

    pub fn favorites(&self) -> &[FavoriteEntry] {
        &self.favorites
    }

    pub fn find(&self, id: i64) -> Option<&FavoriteEntry> {
        self.favorites.iter().find(|entry| entry.id == id)
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    pub fn is_initial_load(&self) -> bool {
        self.fetching && self.page_index == 0
    }

    pub fn is_loading_more(&self) -> bool {
        self.fetching && self.page_index > 0
    }

    pub fn begin_fetch(&mut self, page_index: u32, reset: bool) -> PageRequest {
        if reset {
            self.generation += 1;
        }
        self.next_ticket += 1;
        self.latest_ticket = self.next_ticket;
        self.page_index = page_index;
        self.fetching = true;

        PageRequest {
            ticket: self.next_ticket,
            generation: self.generation,
            page_index,
            reset,
            query: PageQuery::for_index(page_index, self.page_size, &self.filters),
        }
    }

    pub fn filters_changed(&mut self, filters: FilterCriteria) -> PageRequest {
        self.filters = filters;
        self.begin_fetch(0, true)
    }

    pub fn invalidate(&mut self) -> PageRequest {
        self.begin_fetch(0, true)
    }

    pub fn scrolled_near_bottom(&mut self) -> Option<PageRequest> {
        if self.fetching {
            return None;
        }
        if self.rows_outdated {
            return Some(self.begin_fetch(0, true));
        }
        if !self.has_more {
            return None;
        }
        Some(self.begin_fetch(self.page_index + 1, false))
    }

    pub fn apply_page(&mut self, request: &PageRequest, page: FavoritePage) -> ApplyOutcome {
        self.settle(request);
        if request.generation != self.generation {
            return ApplyOutcome::Stale;
        }

        self.has_more = page.has_more;
        let count = page.data.len();
        if request.reset {
            self.rows_outdated = false;
            self.favorites = page.data;
            ApplyOutcome::Replaced(count)
        } else {
            self.favorites.extend(page.data);
            ApplyOutcome::Appended(count)
        }
    }

    pub fn apply_failure(&mut self, request: &PageRequest) -> ApplyOutcome {
        self.settle(request);
        if request.generation != self.generation {
            return ApplyOutcome::Stale;
        }
        if request.reset {
            self.rows_outdated = true;
        } else if self.page_index == request.page_index {
            self.page_index = request.page_index.saturating_sub(1);
        }
        ApplyOutcome::Failed
    }

    fn settle(&mut self, request: &PageRequest) {
        if request.ticket == self.latest_ticket {
            self.fetching = false;
        }
    }
}

impl Default for ListState {
    fn default() -> Self {
        Self::new(10)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub inner_height: u32,
    pub scroll_top: u32,
    pub document_height: u32,
}

impl Viewport {
    pub fn scrolled_to_end(document_height: u32, inner_height: u32) -> Self {
        Self {
            inner_height,
            scroll_top: document_height.saturating_sub(inner_height),
            document_height,
        }
    }

    pub fn is_near_bottom(&self, threshold: u32) -> bool {
        self.inner_height.saturating_add(self.scroll_top)
            >= self.document_height.saturating_sub(threshold)
    }
}
