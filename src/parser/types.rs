//! Type parsing implementation.
//!
//! This module handles parsing of type annotations. It supports:
//!
//! - Named types (`Number`, `Shape`)
//! - The any type `*` and `void`
//! - Parameterized types (`Array<Number>`, `Promise<String>`)
//! - The array shorthand `[T]`
//!
//! Similar to expression parsing, it uses NUD/LED handlers with
//! binding powers for parsing complex type expressions.

use std::collections::HashMap;

use crate::{
    ast::types::{TypeExpr, TypeExprKind},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser};

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<TypeExpr, Error>;

/// Type alias for type left denotation handler functions.
pub type TypeLEDHandler = fn(&mut Parser, TypeExpr, BindingPower) -> Result<TypeExpr, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Type alias for type LED lookup table.
pub type TypeLEDLookup = HashMap<TokenKind, TypeLEDHandler>;

/// Type alias for type binding power lookup table.
pub type TypeBPLookup = HashMap<TokenKind, BindingPower>;

/// Initializes the type parsing lookup tables.
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
    parser.type_nud(TokenKind::Star, parse_any_type);
    parser.type_nud(TokenKind::Void, parse_void_type);
    parser.type_nud(TokenKind::OpenBracket, parse_array_type);
    parser.type_led(TokenKind::Less, BindingPower::Call, parse_parameterized_type);
}

pub fn parse_symbol_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    Ok(TypeExpr::new(TypeExprKind::Name(token.value), token.span))
}

pub fn parse_any_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    let token = parser.advance();
    Ok(TypeExpr::new(TypeExprKind::Any, token.span))
}

pub fn parse_void_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    let token = parser.advance();
    Ok(TypeExpr::new(TypeExprKind::Void, token.span))
}

pub fn parse_array_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    let start = parser.advance().span.start;
    let element = parse_type(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(TypeExpr::new(
        TypeExprKind::Array(Box::new(element)),
        parser.span_from(start),
    ))
}

pub fn parse_parameterized_type(
    parser: &mut Parser,
    left: TypeExpr,
    _bp: BindingPower,
) -> Result<TypeExpr, Error> {
    let base = match left.kind {
        TypeExprKind::Name(name) => name,
        _ => return Err(parser.unexpected("only named types take type arguments")),
    };

    parser.expect(TokenKind::Less)?;

    let mut arguments = vec![parse_type(parser, BindingPower::Default)?];
    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        arguments.push(parse_type(parser, BindingPower::Default)?);
    }

    parser.expect(TokenKind::Greater)?;

    Ok(TypeExpr::new(
        TypeExprKind::Parameterized { base, arguments },
        parser.span_from(left.span.start),
    ))
}

pub fn parse_type(parser: &mut Parser, bp: BindingPower) -> Result<TypeExpr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_type_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: parser.current_token().value.clone(),
                    message: String::from("expected a type"),
                },
                parser.get_position(),
            ))
        }
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let token_bp = *parser
            .get_type_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if token_bp <= bp {
            break;
        }

        let led = match parser.get_type_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: parser.current_token().value.clone(),
                    },
                    parser.get_position(),
                ))
            }
        };

        left = led(parser, left, token_bp)?;
    }

    Ok(left)
}
