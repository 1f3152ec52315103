use phf::phf_map;

/// Supported interface languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Locale {
    #[default]
    En,
    Vi,
}

static EN: phf::Map<&'static str, &'static str> = phf_map! {
    "nav.main" => "Main",
    "nav.lines" => "Lines",
    "nav.test" => "Test",
    "nav.library" => "Library",
    "nav.contact" => "Contact",
    "nav.logout" => "Logout",
    "sheet.title" => "Ads.txt Library",
    "table.loading" => "Loading data...",
    "table.error" => "Failed to load data",
    "table.no_results" => "No results found",
    "table.filters" => "Filters",
    "table.filter_placeholder" => "Search in table...",
    "table.columns" => "Columns",
    "table.toggle_columns" => "Toggle Columns",
    "table.rows" => "rows",
    "status.loaded" => "Loaded",
    "status.open_url" => "Sheet url",
    "status.help" => "Help",
    "status.started" => "Started sv!",
};

static VI: phf::Map<&'static str, &'static str> = phf_map! {
    "nav.main" => "Trang chủ",
    "nav.lines" => "Dòng",
    "nav.test" => "Kiểm tra",
    "nav.library" => "Thư viện",
    "nav.contact" => "Liên hệ",
    "nav.logout" => "Đăng xuất",
    "sheet.title" => "Thư viện Ads.txt",
    "table.loading" => "Đang tải dữ liệu...",
    "table.error" => "Không thể tải dữ liệu",
    "table.no_results" => "Không tìm thấy kết quả",
    "table.filters" => "Bộ lọc",
    "table.filter_placeholder" => "Tìm trong bảng...",
    "table.columns" => "Cột",
    "table.toggle_columns" => "Ẩn/hiện cột",
    "table.rows" => "dòng",
    "status.loaded" => "Đã tải",
    "status.open_url" => "Đường dẫn trang tính",
    "status.help" => "Trợ giúp",
    "status.started" => "Đã khởi động sv!",
};

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Vi];

    pub fn name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Vi => "Tiếng Việt",
        }
    }

    /// Next locale in `Locale::ALL`, wrapping around.
    pub fn next(self) -> Locale {
        let idx = Locale::ALL.iter().position(|&l| l == self).unwrap_or(0);
        Locale::ALL[(idx + 1) % Locale::ALL.len()]
    }

    /// Look up `key`, falling back to the key itself when there is no translation.
    pub fn translate<'a>(self, key: &'a str) -> &'a str {
        let table = match self {
            Locale::En => &EN,
            Locale::Vi => &VI,
        };
        table.get(key).copied().unwrap_or(key)
    }
}
