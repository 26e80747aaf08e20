#![allow(dead_code)]

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A small gallery page with a doctype, a comment, nested lists and a void element.
pub const GALLERY_HTML: &str = r#"<!DOCTYPE html><html lang="en-US">
<head>
<title>Hello,World!</title>
</head>
<body>
<div class="container">
<header>
	<!-- Logo -->
   <h1>City Gallery</h1>
</header>
<nav>
  <ul>
    <li><a href="/London">London</a></li>
    <li><a href="/Paris">Paris</a></li>
    <li><a href="/Tokyo">Tokyo</a></li>
  </ul>
</nav>
<article>
  <h1>London</h1>
  <img src="pic_mountain.jpg" alt="Mountain View" style="width:304px;height:228px;">
  <p>London is the capital city of England.</p>
  <p>Standing on the River Thames, London has been a major settlement for two millennia.</p>
</article>
<footer>Copyright &copy; W3Schools.com</footer>
</div>
</body>
</html>
"#;

/// Sloppy markup: unclosed paragraphs and an unterminated end tag.
pub const SIMPLE_HTML: &str = r#"<!DOCTYPE html><html>
<head>
<title>your title here</title>
</head>
<body bgcolor="ffffff">
<center><img src="clouds.jpg" align="bottom"> </center>
<hr>
<a href="http://somegreatsite.com">link name</a>
is a link to another nifty site
<h1>this is a header</h1>
<h2>this is a medium header</h2>
send me mail at <a href="mailto:support@yourcompany.com">support@yourcompany.com</a>.
<p> this is a new paragraph!
<p> <b>this is a new paragraph!</b>
<br> <b><i>this is a new sentence without a paragraph break, in bold italics.</i></b>
<hr>
</body>
</html"#;

pub const BOOKSTORE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bookstore>
<book category="children">
  <title lang="en">Harry Potter</title>
  <author>J K. Rowling</author>
  <price>29.99</price>
</book>
<book category="web">
  <title lang="en">Learning XML</title>
  <author>Erik T. Ray</author>
  <price>39.95</price>
</book>
</bookstore>"#;

pub const NOTE_XML: &str = r#"<?xml version="1.0"?>
<note>
  <to>Tove</to>
  <from>Jani</from>
  <heading>Reminder</heading>
  <body>Don't forget me this weekend!</body>
</note>"#;

/// Siblings at several depths; indentation included.
pub const NESTED_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<AAA>
    <BBB>
        <DDD>
            <CCC>
                <DDD/>
                <EEE/>
            </CCC>
        </DDD>
    </BBB>
    <CCC>
        <DDD>
            <EEE>
                <DDD>
                    <FFF/>
                </DDD>
            </EEE>
        </DDD>
    </CCC>
</AAA>"#;
