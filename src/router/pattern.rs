//! Route patterns.

/// A route pattern: a literal path, a path with `:param` segments captured
/// positionally, or a raw pattern matched verbatim and exempt from parent
/// prefixing.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    raw: bool,
    text: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Param(#[allow(dead_code)] String),
}

impl RoutePattern {
    /// Parse a literal or parameterized segment pattern. Leading and trailing
    /// slashes are insignificant.
    pub fn parse(path: &str) -> Self {
        let text = path.trim_matches('/').to_string();
        let segments = text
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(segment.to_string()),
            })
            .collect();
        Self {
            raw: false,
            text,
            segments,
        }
    }

    /// A pattern used verbatim: matched by exact path equality and never
    /// joined with a parent pattern.
    pub fn raw(path: &str) -> Self {
        Self {
            raw: true,
            text: path.to_string(),
            segments: Vec::new(),
        }
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Match `url` against this pattern, yielding the positional args
    /// captured by `:param` segments.
    pub fn matches(&self, url: &str) -> Option<Vec<String>> {
        let trimmed = url.trim_matches('/');
        if self.raw {
            return (trimmed == self.text.trim_matches('/')).then(Vec::new);
        }
        let parts: Vec<&str> = trimmed
            .split('/')
            .filter(|part| !part.is_empty())
            .collect();
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut args = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Param(_) => args.push(part.to_string()),
            }
        }
        Some(args)
    }
}
