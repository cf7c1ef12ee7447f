//! CSS locators for the map-search results layout.

/// Scrollable results container.
pub const RESULTS_FEED: &str = "div[role=\"feed\"]";

/// One link per listing entry in the feed.
pub const ENTRY_LINK: &str = "a.hfpxzc";

/// Attribute holding an entry's business name.
pub const ENTRY_LABEL_ATTR: &str = "aria-label";

/// Heading of the detail view.
pub const DETAIL_HEADING: &str = "h1.DUwDvf, h1.fontHeadlineLarge";

pub const REVIEW_BLOB: &str = "div.F7nice";
pub const PRICING: &str = "span.mgr77e";
pub const ADDRESS: &str = "[data-item-id='address']";
pub const WEBSITE: &str = "[data-item-id='authority']";
pub const PHONE: &str = "[data-item-id^='phone:tel:']";
pub const HOURS: &str = "[jsaction*='pane.openhours'] span.ZDu9vd";
pub const PLUS_CODE: &str = "[data-item-id='oloc']";
