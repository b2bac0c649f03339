/// One entry of a pagination control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub label: String,
    pub page: u32,
    pub active: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Pager {
    pub current: u32,
    pub total_pages: u32,
    pub links: Vec<PageLink>,
}

impl Pager {
    /// Previous, a window of up to five pages around `current`, next.
    /// `current` is clamped to `1..=total_pages`.
    pub fn new(current: u32, total_pages: u32) -> Self {
        let current = current.clamp(1, total_pages.max(1));
        let mut links = Vec::new();

        links.push(PageLink {
            label: "Previous".to_string(),
            page: current.saturating_sub(1).max(1),
            active: false,
            disabled: current <= 1,
        });

        let first = current.saturating_sub(2).max(1);
        let last = current.saturating_add(2).min(total_pages);
        for p in first..=last {
            links.push(PageLink {
                label: p.to_string(),
                page: p,
                active: p == current,
                disabled: false,
            });
        }

        links.push(PageLink {
            label: "Next".to_string(),
            page: current.saturating_add(1),
            active: false,
            disabled: current >= total_pages,
        });

        Self {
            current,
            total_pages,
            links,
        }
    }

    pub fn is_needed(&self) -> bool {
        self.total_pages > 1
    }
}

pub fn total_pages(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(p: &Pager) -> Vec<&str> {
        p.links.iter().map(|l| l.label.as_str()).collect()
    }

    #[test]
    fn window_around_current_page() {
        let p = Pager::new(5, 10);
        assert_eq!(labels(&p), ["Previous", "3", "4", "5", "6", "7", "Next"]);
        assert!(p.links.iter().any(|l| l.active && l.page == 5));
        assert_eq!(p.links[0].page, 4);
        assert_eq!(p.links.last().unwrap().page, 6);
    }

    #[test]
    fn edges_disable_prev_and_next() {
        let first = Pager::new(1, 3);
        assert_eq!(labels(&first), ["Previous", "1", "2", "3", "Next"]);
        assert!(first.links[0].disabled);
        assert!(!first.links.last().unwrap().disabled);

        let last = Pager::new(3, 3);
        assert!(!last.links[0].disabled);
        assert!(last.links.last().unwrap().disabled);
    }

    #[test]
    fn out_of_range_page_is_clamped() {
        let p = Pager::new(u32::MAX, 0);
        assert_eq!(p.current, 1);
        assert_eq!(labels(&p), ["Previous", "Next"]);
        assert!(p.links.iter().all(|l| l.disabled));

        let p = Pager::new(u32::MAX, 4);
        assert_eq!(p.current, 4);
        assert_eq!(labels(&p), ["Previous", "2", "3", "4", "Next"]);
        assert!(p.links.last().unwrap().disabled);
    }

    #[test]
    fn user_pages_from_total() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert!(!Pager::new(1, 1).is_needed());
    }
}
