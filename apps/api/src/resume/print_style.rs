// Fixed stylesheet for the print surface. The rendered markup carries no
// inline styles or classes, so this is the only styling the printout gets.

pub const PRINT_TITLE: &str = "Resume";

pub const PRINT_STYLESHEET: &str = r#"
* {
  margin: 0;
  padding: 0;
  box-sizing: border-box;
}

body {
  font-family: Arial, sans-serif;
  font-size: 12px;
  line-height: 1.4;
  color: #000;
  background: #fff;
  padding: 20px;
}

h1, h2, h3, h4, h5, h6 {
  color: #333;
  margin: 10px 0 5px 0;
  font-weight: bold;
}

h1 { font-size: 24px; }
h2 { font-size: 18px; }
h3 { font-size: 16px; }
h4, h5, h6 { font-size: 14px; }

p { margin: 5px 0; }

a {
  color: #0066cc;
  text-decoration: underline;
}

ul, ol { margin: 10px 0 10px 20px; }
li { margin: 2px 0; }

strong, b {
  font-weight: bold;
  color: #000;
}

em, i { font-style: italic; }

code {
  background: #f5f5f5;
  padding: 2px 4px;
  font-family: monospace;
}

pre {
  background: #f5f5f5;
  padding: 10px;
  margin: 10px 0;
  overflow: auto;
}

blockquote {
  border-left: 3px solid #ccc;
  padding-left: 15px;
  margin: 10px 0;
  color: #666;
}

table {
  border-collapse: collapse;
  width: 100%;
  margin: 10px 0;
}

th, td {
  border: 1px solid #ddd;
  padding: 8px;
  text-align: left;
}

th {
  background-color: #f5f5f5;
  font-weight: bold;
}

@media print {
  body { padding: 0; }
}
"#;
