//! HTML rendering for the browser-facing pages. Pure functions from view
//! data to markup; swapping in a template engine would only change this
//! module.

use std::fmt::Write;

/// One row of the listing page.
#[derive(Debug, Clone)]
pub struct FileView {
    pub name: String,
    pub size: u64,
    pub url: String,
}

pub fn listing_page(files: &[FileView]) -> String {
    let mut rows = String::new();
    for file in files {
        let _ = write!(
            rows,
            r#"<tr><td><a href="{url}">{name}</a></td><td>{size}</td><td><button class="delete" data-name="{name}">Delete</button></td></tr>"#,
            url = html_escape(&file.url),
            name = html_escape(&file.name),
            size = format_bytes(file.size),
        );
    }

    let body = if files.is_empty() {
        "<p>No files yet. <a href=\"/upload\">Upload one</a>.</p>".to_string()
    } else {
        format!(
            "<table><tr><th>Name</th><th>Size</th><th></th></tr>{rows}</table>"
        )
    };

    page(
        "Files",
        &format!(
            r#"<h1>Files</h1>
{body}
<p><a href="/upload">Upload a file</a></p>
<script>
document.querySelectorAll('.delete').forEach(function (button) {{
  button.addEventListener('click', function () {{
    var name = button.getAttribute('data-name');
    if (!confirm('Delete "' + name + '"?')) return;
    var xhr = new XMLHttpRequest();
    xhr.open('POST', '/delete');
    xhr.setRequestHeader('Content-Type', 'application/json');
    xhr.onload = function () {{
      var reply = JSON.parse(xhr.responseText);
      if (reply.error) {{ alert(reply.message); }} else {{ window.location.reload(); }}
    }};
    xhr.send(JSON.stringify({{ filename: name }}));
  }});
}});
</script>"#
        ),
    )
}

pub fn upload_page(message: Option<&str>, is_error: bool) -> String {
    let status = match message {
        Some(text) if !text.is_empty() => {
            let class = if is_error { "status error" } else { "status ok" };
            format!(r#"<p class="{class}">{}</p>"#, html_escape(text))
        }
        _ => String::new(),
    };

    page(
        "Upload",
        &format!(
            r#"<h1>Upload a file</h1>
{status}
<form id="upload-form" action="/upload" method="post" enctype="multipart/form-data">
  <input type="file" name="fileToUpload" required>
  <button type="submit">Upload</button>
</form>
<div id="result"></div>
<p><a href="/">Back to the file list</a></p>
<script>
var form = document.getElementById('upload-form');
form.addEventListener('submit', function (event) {{
  event.preventDefault();
  var xhr = new XMLHttpRequest();
  xhr.open('POST', '/upload');
  xhr.setRequestHeader('X-Requested-With', 'XMLHttpRequest');
  xhr.onload = function () {{
    var reply = JSON.parse(xhr.responseText);
    var result = document.getElementById('result');
    result.textContent = reply.message;
    result.className = reply.error ? 'status error' : 'status ok';
  }};
  xhr.send(new FormData(form));
}});
</script>"#
        ),
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; max-width: 640px; margin: 2em auto; padding: 0 1em; }}
table {{ width: 100%; border-collapse: collapse; }}
th, td {{ padding: 6px 10px; text-align: left; border-bottom: 1px solid #ddd; }}
.status.error {{ color: #b00020; }}
.status.ok {{ color: #1b5e20; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#
    )
}

pub fn html_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Human-readable size with binary units, one decimal place above bytes.
pub fn format_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{} B", bytes);
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let units = ["K", "M", "G", "T", "P", "E"];
    format!("{:.1} {}iB", bytes as f64 / div as f64, units[exp])
}
