use crate::{
    ast::expressions::{Expr, ExprKind},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: parser.current_token().value.clone() },
                parser.get_position(),
            ))
        }
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let token_bp = *parser.get_bp_lookup().get(&token_kind).unwrap_or(&BindingPower::Default);
        if token_bp <= bp {
            break;
        }

        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnexpectedToken { token: parser.current_token().value.clone() },
                    parser.get_position(),
                ))
            }
        };

        left = led(parser, left, token_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance();
    let kind = match token.kind {
        TokenKind::Number => match token.value.parse::<f64>() {
            Ok(value) => ExprKind::Number(value),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value.clone() },
                    token.span.start.clone(),
                ))
            }
        },
        TokenKind::Identifier => ExprKind::Symbol(token.value.clone()),
        TokenKind::String => ExprKind::String(token.value.clone()),
        TokenKind::True => ExprKind::Boolean(true),
        TokenKind::False => ExprKind::Boolean(false),
        TokenKind::Null => ExprKind::Null,
        TokenKind::This => ExprKind::This,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value.clone() },
                token.span.start.clone(),
            ))
        }
    };

    Ok(Expr::new(kind, token.span))
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance();

    let right = parse_expr(parser, bp)?;
    let span = left.span.to(&right.span);

    Ok(Expr::new(
        ExprKind::Binary {
            left: Box::new(left),
            operator: operator_token.kind,
            right: Box::new(right),
        },
        span,
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance();
    let operand = parse_expr(parser, BindingPower::Unary)?;
    let span = operator_token.span.to(&operand.span);

    Ok(Expr::new(
        ExprKind::Prefix {
            operator: operator_token.kind,
            operand: Box::new(operand),
        },
        span,
    ))
}

pub fn parse_assignment_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    if !left.is_assignable() {
        return Err(parser.unexpected("left side of an assignment must be a name or a property"));
    }

    let operator_token = parser.advance();
    // Right associative: `a = b = c`
    let value = parse_expr(parser, BindingPower::Comma)?;
    let span = left.span.to(&value.span);

    Ok(Expr::new(
        ExprKind::Assignment {
            assignee: Box::new(left),
            operator: operator_token.kind,
            value: Box::new(value),
        },
        span,
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// Parses comma separated expressions up to and including `close`.
fn parse_expr_list(parser: &mut Parser, close: TokenKind) -> Result<Vec<Expr>, Error> {
    let mut items = vec![];

    while parser.current_token_kind() != close {
        items.push(parse_expr(parser, BindingPower::Comma)?);

        if parser.current_token_kind() != close {
            parser.expect(TokenKind::Comma)?;
        }
    }

    parser.expect(close)?;
    Ok(items)
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();

    let arguments = parse_expr_list(parser, TokenKind::CloseParen)?;
    let span = parser.span_from(left.span.start.clone());

    Ok(Expr::new(
        ExprKind::Call {
            callee: Box::new(left),
            arguments,
        },
        span,
    ))
}

pub fn parse_member_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let error = parser.unexpected("expected a property name after `.`");
    let property = parser.expect_error(TokenKind::Identifier, Some(error))?;
    let span = left.span.to(&property.span);

    Ok(Expr::new(
        ExprKind::Member {
            object: Box::new(left),
            property: property.value,
            property_span: property.span,
        },
        span,
    ))
}

pub fn parse_array_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;

    let elements = parse_expr_list(parser, TokenKind::CloseBracket)?;

    Ok(Expr::new(ExprKind::Array(elements), parser.span_from(start)))
}

pub fn parse_new_expr(parser: &mut Parser) -> Result<Expr, Error> {
    // new Shape(1, 2)
    let start = parser.advance().span.start;

    // Stops before `(` so the arguments belong to `new`, not to a call.
    let class = parse_expr(parser, BindingPower::Call)?;

    let arguments = if parser.current_token_kind() == TokenKind::OpenParen {
        parser.advance();
        parse_expr_list(parser, TokenKind::CloseParen)?
    } else {
        vec![]
    };

    Ok(Expr::new(
        ExprKind::New {
            class: Box::new(class),
            arguments,
        },
        parser.span_from(start),
    ))
}

pub fn parse_await_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;
    parser.mark_await();

    let operand = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expr::new(ExprKind::Await(Box::new(operand)), parser.span_from(start)))
}

pub fn parse_yield_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;
    parser.mark_yield();

    let operand = match parser.current_token_kind() {
        TokenKind::Semicolon
        | TokenKind::CloseParen
        | TokenKind::CloseBracket
        | TokenKind::CloseCurly
        | TokenKind::Comma
        | TokenKind::EOF => None,
        _ => Some(Box::new(parse_expr(parser, BindingPower::Comma)?)),
    };

    Ok(Expr::new(ExprKind::Yield(operand), parser.span_from(start)))
}
