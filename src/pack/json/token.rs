/// Token classes produced by [`Tokenizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TokenKind {
	/// End of input.
	End,
	/// Unrecognized or malformed input.
	Error,
	True,
	False,
	Null,
	String,
	Number,
	Comma,
	Colon,
	OpenCurly,
	CloseCurly,
	OpenBracket,
	CloseBracket,
}

/// One lexical token and its byte range in the source text.
#[derive(Debug, Clone, Copy)]
pub(super) struct Token {
	pub kind: TokenKind,
	pub start: usize,
	pub end: usize,
}

/// Streaming JSON tokenizer that skips whitespace and `//`, `/* */` comments.
pub(super) struct Tokenizer<'a> {
	text: &'a str,
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Tokenizer<'a> {
	pub fn new(text: &'a str) -> Self {
		Self {
			text,
			bytes: text.as_bytes(),
			pos: 0,
		}
	}

	/// Source text of `token`.
	pub fn text(&self, token: Token) -> &'a str {
		&self.text[token.start..token.end]
	}

	pub fn next_token(&mut self) -> Token {
		self.skip_spaces_and_comments();
		let start = self.pos;

		let kind = match self.current() {
			None => TokenKind::End,
			Some(b't') => self.keyword("true", TokenKind::True),
			Some(b'f') => self.keyword("false", TokenKind::False),
			Some(b'n') => self.keyword("null", TokenKind::Null),
			Some(b'"') => self.string(),
			Some(b'-' | b'0'..=b'9') => self.number(),
			Some(byte) => {
				let kind = match byte {
					b',' => TokenKind::Comma,
					b':' => TokenKind::Colon,
					b'{' => TokenKind::OpenCurly,
					b'}' => TokenKind::CloseCurly,
					b'[' => TokenKind::OpenBracket,
					b']' => TokenKind::CloseBracket,
					_ => TokenKind::Error,
				};
				if kind != TokenKind::Error {
					self.pos += 1;
				}
				kind
			}
		};

		Token { kind, start, end: self.pos }
	}

	fn current(&self) -> Option<u8> {
		self.bytes.get(self.pos).copied()
	}

	fn peek(&self) -> Option<u8> {
		self.bytes.get(self.pos + 1).copied()
	}

	fn keyword(&mut self, word: &str, kind: TokenKind) -> TokenKind {
		let start = self.pos;
		while self.current().is_some_and(|byte| byte.is_ascii_alphanumeric()) {
			self.pos += 1;
		}

		if &self.text[start..self.pos] == word { kind } else { TokenKind::Error }
	}

	fn string(&mut self) -> TokenKind {
		self.pos += 1;

		loop {
			match self.current() {
				None => return TokenKind::Error,
				Some(b'"') => {
					self.pos += 1;
					return TokenKind::String;
				}
				Some(b'\\') => {
					self.pos += 1;
					match self.current() {
						Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => self.pos += 1,
						Some(b'u') => {
							let digits = self.bytes.get(self.pos + 1..self.pos + 5);
							if !digits.is_some_and(|digits| digits.iter().all(u8::is_ascii_hexdigit)) {
								return TokenKind::Error;
							}
							self.pos += 5;
						}
						_ => return TokenKind::Error,
					}
				}
				Some(byte) if byte < b' ' => return TokenKind::Error,
				Some(_) => self.pos += 1,
			}
		}
	}

	fn number(&mut self) -> TokenKind {
		if self.current() == Some(b'-') {
			self.pos += 1;
		}

		if !self.digits() {
			return TokenKind::Error;
		}

		if self.current() == Some(b'.') {
			self.pos += 1;
			if !self.digits() {
				return TokenKind::Error;
			}
		}

		if matches!(self.current(), Some(b'e' | b'E')) {
			self.pos += 1;
			if matches!(self.current(), Some(b'-' | b'+')) {
				self.pos += 1;
			}
			if !self.digits() {
				return TokenKind::Error;
			}
		}

		TokenKind::Number
	}

	fn digits(&mut self) -> bool {
		let start = self.pos;
		while self.current().is_some_and(|byte| byte.is_ascii_digit()) {
			self.pos += 1;
		}
		self.pos > start
	}

	fn skip_spaces_and_comments(&mut self) {
		loop {
			match (self.current(), self.peek()) {
				(Some(byte), _) if byte.is_ascii_whitespace() => self.pos += 1,
				(Some(b'/'), Some(b'/')) => {
					while self.current().is_some_and(|byte| byte != b'\r' && byte != b'\n') {
						self.pos += 1;
					}
				}
				(Some(b'/'), Some(b'*')) => {
					let Some(close) = self.text[self.pos + 2..].find("*/") else {
						// Unterminated comment is left for the parser to reject.
						return;
					};
					self.pos += 2 + close + 2;
				}
				_ => return,
			}
		}
	}
}

/// Decode the body of a string token (without its quotes).
pub(super) fn unescape(body: &str) -> Option<String> {
	let mut out = String::with_capacity(body.len());
	let mut chars = body.chars();

	while let Some(ch) = chars.next() {
		if ch != '\\' {
			out.push(ch);
			continue;
		}

		match chars.next()? {
			'"' => out.push('"'),
			'\\' => out.push('\\'),
			'/' => out.push('/'),
			'b' => out.push('\u{8}'),
			'f' => out.push('\u{c}'),
			'n' => out.push('\n'),
			'r' => out.push('\r'),
			't' => out.push('\t'),
			'u' => {
				let high = hex4(&mut chars)?;
				let code = if (0xD800..0xDC00).contains(&high) {
					let rest = chars.as_str();
					match rest.strip_prefix("\\u").and_then(|tail| u32::from_str_radix(tail.get(..4)?, 16).ok()) {
						Some(low) if (0xDC00..0xE000).contains(&low) => {
							chars = rest[6..].chars();
							0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
						}
						_ => 0xFFFD,
					}
				} else {
					high
				};
				out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
			}
			_ => return None,
		}
	}

	Some(out)
}

fn hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
	let mut code = 0;
	for _ in 0..4 {
		code = code * 16 + chars.next()?.to_digit(16)?;
	}
	Some(code)
}
