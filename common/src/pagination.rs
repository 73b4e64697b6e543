//! 取得済み一覧のクライアント側ページング

/// 1ページあたりの表示件数
pub const PAGE_SIZE: usize = 10;

/// 表示中のページ
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1始まり
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 先頭行の通し番号（S.No表示用、1始まり）
    pub first_index: usize,
}

impl<T> Page<'_, T> {
    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.number > 1
    }
}

/// 総ページ数（0件でも0）
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// ページ番号を 1..=max(総ページ数, 1) に丸める
pub fn clamp_page(page: usize, total_items: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(total_items, page_size).max(1))
}

pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let number = clamp_page(page, items.len(), page_size);
    let start = ((number - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());

    Page {
        items: &items[start..end],
        number,
        total_pages: total_pages(items.len(), page_size),
        total_items: items.len(),
        first_index: start + 1,
    }
}
