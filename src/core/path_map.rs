//! 本地/远程命名空间转换，只做字符串处理，不访问文件系统

use std::path::Path;

#[derive(Debug, Clone)]
pub struct PathMapper {
    /// 本地根目录（绝对路径），对应命名空间中的 `.`
    local_root: String,
    /// 远程根目录，去掉末尾 `/`；远程根为 `/` 时为空串
    remote_root: String,
}

impl PathMapper {
    pub fn new(local_root: &Path, remote_root: &str) -> Self {
        let local_root = local_root
            .to_string_lossy()
            .replace('\\', "/")
            .trim_end_matches('/')
            .to_string();
        Self {
            local_root,
            remote_root: remote_root.trim_end_matches('/').to_string(),
        }
    }

    pub fn remote_root(&self) -> &str {
        if self.remote_root.is_empty() {
            "/"
        } else {
            &self.remote_root
        }
    }

    /// 绝对本地路径或远程路径 -> 本地命名空间
    ///
    /// 已经是本地命名空间的路径原样返回（仅统一分隔符）。
    pub fn to_local(&self, path: &str) -> String {
        let path = path.replace('\\', "/");

        if let Some(rest) = strip_root(&path, &self.local_root) {
            return format!(".{}", rest);
        }

        if self.remote_root.is_empty() {
            if path.starts_with('/') {
                return format!(".{}", path.trim_end_matches('/'));
            }
        } else if let Some(rest) = strip_root(&path, &self.remote_root) {
            return format!(".{}", rest);
        }

        path
    }

    /// 本地命名空间 -> 远程路径，首段不是 `.` 时原样返回
    pub fn to_remote(&self, path: &str) -> String {
        let path = path.replace('\\', "/");
        if path == "." {
            return self.remote_root().to_string();
        }
        match path.strip_prefix("./") {
            Some(rest) => format!("{}/{}", self.remote_root, rest),
            None => path,
        }
    }
}

/// `root` 本身返回空串，`root/x` 返回 `/x`，其余返回 None
fn strip_root<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    if root.is_empty() {
        return None;
    }
    let rest = path.strip_prefix(root)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest.trim_end_matches('/'))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> PathMapper {
        PathMapper::new(Path::new("/home/dev/site"), "/public_html/")
    }

    #[test]
    fn test_to_local() {
        let m = mapper();
        assert_eq!(m.to_local("/home/dev/site/css/site.css"), "./css/site.css");
        assert_eq!(m.to_local("/home/dev/site"), ".");
        assert_eq!(m.to_local("/public_html/css"), "./css");
        assert_eq!(m.to_local("/public_html"), ".");
        assert_eq!(m.to_local("./js\\app.js"), "./js/app.js");
        // 只替换完整的首段
        assert_eq!(m.to_local("/public_html2/x"), "/public_html2/x");
    }

    #[test]
    fn test_to_remote() {
        let m = mapper();
        assert_eq!(m.to_remote("."), "/public_html");
        assert_eq!(m.to_remote("./css/site.css"), "/public_html/css/site.css");
        assert_eq!(m.to_remote("a/b"), "a/b");
    }

    #[test]
    fn test_to_local_is_idempotent() {
        let m = mapper();
        for p in ["/home/dev/site/js/app.js", "/public_html/img", "./index.html", "."] {
            let once = m.to_local(p);
            assert_eq!(m.to_local(&once), once);
        }
    }

    #[test]
    fn test_round_trip() {
        let m = mapper();
        for p in [".", "./index.html", "./css/site.css", "./a/b/c"] {
            assert_eq!(m.to_local(&m.to_remote(p)), p);
        }
        for p in ["/public_html", "/public_html/index.html", "/public_html/a/b"] {
            assert_eq!(m.to_remote(&m.to_local(p)), p);
        }
    }

    #[test]
    fn test_root_remote() {
        let m = PathMapper::new(Path::new("/srv/site"), "/");
        assert_eq!(m.to_remote("."), "/");
        assert_eq!(m.to_remote("./index.html"), "/index.html");
        assert_eq!(m.to_local("/index.html"), "./index.html");
        assert_eq!(m.to_local("/"), ".");
        // 本地绝对路径优先
        assert_eq!(m.to_local("/srv/site/a.css"), "./a.css");

        let m = PathMapper::new(Path::new("/srv/site"), "www");
        assert_eq!(m.to_remote("./a"), "www/a");
        assert_eq!(m.to_local("www/a"), "./a");
    }
}
