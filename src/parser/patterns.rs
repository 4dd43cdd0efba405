//! Binding pattern parsing.
//!
//! ```text
//! pattern := IDENT (':' type)?
//!          | '[' (pattern (',' pattern)*)? (',' '...' pattern)? ']' (':' type)?
//!          | '{' (field (',' field)*)? '}' (':' type)?
//! field   := IDENT (':' pattern)?
//! ```

use crate::{
    ast::{
        patterns::{Pattern, PatternKind, RecordField},
        types::TypeExpr,
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser, types::parse_type};

pub fn parse_pattern(parser: &mut Parser) -> Result<Pattern, Error> {
    let start = parser.get_position();

    let kind = match parser.current_token_kind() {
        TokenKind::Identifier => PatternKind::Identifier(parser.advance().value),
        TokenKind::OpenBracket => parse_array_pattern(parser)?,
        TokenKind::OpenCurly => parse_record_pattern(parser)?,
        _ => return Err(parser.unexpected("expected a binding name or a destructuring pattern")),
    };

    let annotation = parse_optional_annotation(parser)?;
    Ok(Pattern::new(kind, annotation, parser.span_from(start)))
}

pub fn parse_optional_annotation(parser: &mut Parser) -> Result<Option<TypeExpr>, Error> {
    if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Ok(Some(parse_type(parser, BindingPower::Default)?))
    } else {
        Ok(None)
    }
}

fn parse_array_pattern(parser: &mut Parser) -> Result<PatternKind, Error> {
    parser.expect(TokenKind::OpenBracket)?;

    let mut elements = vec![];
    let mut rest = None;

    while parser.current_token_kind() != TokenKind::CloseBracket {
        if parser.current_token_kind() == TokenKind::Ellipsis {
            parser.advance();
            rest = Some(Box::new(parse_pattern(parser)?));
            break;
        }

        elements.push(parse_pattern(parser)?);

        if parser.current_token_kind() != TokenKind::CloseBracket {
            parser.expect(TokenKind::Comma)?;
        }
    }

    let error = parser.unexpected("a rest element must be the last element");
    parser.expect_error(TokenKind::CloseBracket, Some(error))?;

    Ok(PatternKind::Array { elements, rest })
}

fn parse_record_pattern(parser: &mut Parser) -> Result<PatternKind, Error> {
    parser.expect(TokenKind::OpenCurly)?;

    let mut fields = vec![];

    while parser.current_token_kind() != TokenKind::CloseCurly {
        let key = parser.expect(TokenKind::Identifier)?;

        let value = if parser.current_token_kind() == TokenKind::Colon {
            parser.advance();
            parse_pattern(parser)?
        } else {
            Pattern::new(PatternKind::Identifier(key.value.clone()), None, key.span.clone())
        };

        fields.push(RecordField {
            key: key.value,
            key_span: key.span,
            value,
        });

        if parser.current_token_kind() != TokenKind::CloseCurly {
            parser.expect(TokenKind::Comma)?;
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(PatternKind::Record { fields })
}
