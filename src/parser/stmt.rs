use crate::{
    ast::{
        ast::{Attributes, NodeId, Visibility},
        statements::{
            BlockStmt, ClassDefinition, FunctionBody, FunctionCommon, FunctionDefinition, IfStmt,
            IncludeDirective, Parameter, ParameterKind, ReturnStmt, Stmt, VariableBinding,
            VariableDefinition, WhileStmt,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Position,
};

use super::{
    parser::{DefinitionContext, Parser},
    patterns::{parse_optional_annotation, parse_pattern},
    types::parse_type,
};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if let Some(handler) = parser.get_stmt_lookup().get(&parser.current_token_kind()) {
        let handler = *handler;
        return handler(parser);
    }

    let expr = parse_expr(parser, BindingPower::Default)?;

    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Expression(expr))
}

fn not_allowed_here(kind: &str, position: Position) -> Error {
    Error::new(
        ErrorImpl::DefinitionNotAllowedHere {
            kind: String::from(kind),
        },
        position,
    )
}

pub fn parse_attributed_definition(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.get_position();

    if parser.context() == DefinitionContext::Local {
        return Err(parser.unexpected(
            "attributes are only allowed on top-level and class member definitions",
        ));
    }

    let mut attributes = Attributes::default();
    while parser.current_token_kind().is_attribute() {
        let visibility = match parser.current_token_kind() {
            TokenKind::Public => Some(Visibility::Public),
            TokenKind::Private => Some(Visibility::Private),
            TokenKind::Protected => Some(Visibility::Protected),
            TokenKind::Internal => Some(Visibility::Internal),
            _ => None,
        };

        if visibility.is_some() && attributes.visibility.is_some() {
            return Err(parser.unexpected("only one visibility attribute is allowed"));
        }

        match parser.advance().kind {
            TokenKind::Static => attributes.is_static = true,
            TokenKind::Override => attributes.is_override = true,
            _ => attributes.visibility = visibility,
        }
    }

    match parser.current_token_kind() {
        TokenKind::Var | TokenKind::Const => parse_variable_with(parser, attributes, start),
        TokenKind::Function => parse_function_with(parser, attributes, start),
        TokenKind::Class | TokenKind::Interface => parse_class_with(parser, attributes, start),
        _ => Err(parser.unexpected("expected a definition after attributes")),
    }
}

pub fn parse_variable_definition(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.get_position();
    parse_variable_with(parser, Attributes::default(), start)
}

fn parse_variable_with(
    parser: &mut Parser,
    attributes: Attributes,
    start: Position,
) -> Result<Stmt, Error> {
    let read_only = parser.advance().kind == TokenKind::Const;

    let mut bindings = vec![];
    loop {
        let pattern = parse_pattern(parser)?;

        let initializer = if parser.current_token_kind() == TokenKind::Assignment {
            parser.advance();
            Some(parse_expr(parser, BindingPower::Comma)?)
        } else {
            None
        };

        if read_only && initializer.is_none() {
            return Err(Error::new(ErrorImpl::ExpectedExplicitValue, pattern.span.start.clone()));
        }

        bindings.push(VariableBinding { pattern, initializer });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Variable(VariableDefinition {
        id: NodeId::next(),
        attributes,
        read_only,
        bindings,
        span: parser.span_from(start),
    }))
}

pub fn parse_function_definition(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.get_position();
    parse_function_with(parser, Attributes::default(), start)
}

fn parse_function_with(
    parser: &mut Parser,
    attributes: Attributes,
    start: Position,
) -> Result<Stmt, Error> {
    if parser.context() == DefinitionContext::Local {
        return Err(not_allowed_here("function", parser.get_position()));
    }
    parser.advance();

    let error = parser.unexpected("expected a function name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?;

    let params = parse_parameters(parser)?;
    let result = parse_optional_annotation(parser)?;

    let (body, flags) = parser.with_function(|parser| match parser.current_token_kind() {
        TokenKind::OpenCurly => {
            let block = parse_block(parser)?;
            let all_paths_return = block.always_returns();
            Ok(FunctionBody::Block { block, all_paths_return })
        }
        TokenKind::Semicolon => {
            parser.advance();
            Ok(FunctionBody::None)
        }
        _ => {
            let expr = parse_expr(parser, BindingPower::Default)?;
            parser.expect(TokenKind::Semicolon)?;
            Ok(FunctionBody::Expression(Box::new(expr)))
        }
    })?;

    Ok(Stmt::Function(FunctionDefinition {
        id: NodeId::next(),
        attributes,
        name: name.value,
        name_span: name.span,
        common: FunctionCommon {
            params,
            result,
            body,
            contains_await: flags.contains_await,
            contains_yield: flags.contains_yield,
        },
        span: parser.span_from(start),
    }))
}

/// Parses `(a:Number, b:Number = 1, ...rest:Array<String>)`.
///
/// Required parameters come first, then optional ones, then at most one
/// rest parameter.
fn parse_parameters(parser: &mut Parser) -> Result<Vec<Parameter>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut params: Vec<Parameter> = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        let position = parser.get_position();

        let param = if parser.current_token_kind() == TokenKind::Ellipsis {
            parser.advance();
            Parameter {
                kind: ParameterKind::Rest,
                pattern: parse_pattern(parser)?,
                default: None,
            }
        } else {
            let pattern = parse_pattern(parser)?;
            if parser.current_token_kind() == TokenKind::Assignment {
                parser.advance();
                Parameter {
                    kind: ParameterKind::Optional,
                    pattern,
                    default: Some(parse_expr(parser, BindingPower::Comma)?),
                }
            } else {
                Parameter {
                    kind: ParameterKind::Required,
                    pattern,
                    default: None,
                }
            }
        };

        let out_of_order = match params.last().map(|p| p.kind) {
            Some(ParameterKind::Rest) => true,
            Some(ParameterKind::Optional) => param.kind == ParameterKind::Required,
            _ => false,
        };
        if out_of_order {
            return Err(Error::new(ErrorImpl::IllegalParameterOrder, position));
        }

        params.push(param);

        if parser.current_token_kind() != TokenKind::CloseParen {
            parser.expect(TokenKind::Comma)?;
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    Ok(params)
}

pub fn parse_class_definition(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.get_position();
    parse_class_with(parser, Attributes::default(), start)
}

fn parse_class_with(
    parser: &mut Parser,
    attributes: Attributes,
    start: Position,
) -> Result<Stmt, Error> {
    let is_interface = parser.current_token_kind() == TokenKind::Interface;
    if parser.context() != DefinitionContext::Package {
        let kind = if is_interface { "interface" } else { "class" };
        return Err(not_allowed_here(kind, parser.get_position()));
    }
    parser.advance();

    let error = parser.unexpected("expected a type name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?;

    let extends = if parser.current_token_kind() == TokenKind::Extends {
        parser.advance();
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect(TokenKind::OpenCurly)?;

    let body = parser.with_context(DefinitionContext::Class, |parser| {
        let mut members = vec![];
        while parser.current_token_kind() != TokenKind::CloseCurly {
            let kind = parser.current_token_kind();
            let is_member = kind.is_attribute()
                || matches!(kind, TokenKind::Var | TokenKind::Const | TokenKind::Function);
            if !is_member {
                return Err(parser.unexpected("expected a member definition"));
            }
            members.push(parse_stmt(parser)?);
        }
        Ok(members)
    })?;

    parser.expect(TokenKind::CloseCurly)?;

    Ok(Stmt::Class(ClassDefinition {
        id: NodeId::next(),
        attributes,
        name: name.value,
        name_span: name.span,
        is_interface,
        extends,
        body,
        span: parser.span_from(start),
    }))
}

pub fn parse_include_directive(parser: &mut Parser) -> Result<Stmt, Error> {
    if parser.context() != DefinitionContext::Package {
        return Err(not_allowed_here("include", parser.get_position()));
    }
    let start = parser.advance().span.start;

    let error = parser.unexpected("expected a file name string");
    let source = parser.expect_error(TokenKind::String, Some(error))?.value;

    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Include(IncludeDirective {
        id: NodeId::next(),
        source,
        span: parser.span_from(start),
        program: None,
    }))
}

fn parse_condition(parser: &mut Parser) -> Result<crate::ast::expressions::Expr, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;
    Ok(condition)
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let condition = parse_condition(parser)?;
    let then_body = parser.with_context(DefinitionContext::Local, parse_stmt)?;

    let else_body = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        Some(Box::new(parser.with_context(DefinitionContext::Local, parse_stmt)?))
    } else {
        None
    };

    Ok(Stmt::If(IfStmt {
        condition,
        then_body: Box::new(then_body),
        else_body,
        span: parser.span_from(start),
    }))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let condition = parse_condition(parser)?;
    let body = parser.with_context(DefinitionContext::Local, parse_stmt)?;

    Ok(Stmt::While(WhileStmt {
        condition,
        body: Box::new(body),
        span: parser.span_from(start),
    }))
}

pub fn parse_block(parser: &mut Parser) -> Result<BlockStmt, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    let body = parser.with_context(DefinitionContext::Local, |parser| {
        let mut statements = Vec::new();
        while parser.current_token_kind() != TokenKind::CloseCurly {
            if !parser.has_tokens() {
                return Err(parser.unexpected("expected `}`"));
            }
            statements.push(parse_stmt(parser)?);
        }
        Ok(statements)
    })?;

    parser.expect(TokenKind::CloseCurly)?;

    Ok(BlockStmt {
        id: NodeId::next(),
        body,
        span: parser.span_from(start),
    })
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Block(parse_block(parser)?))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let value = if parser.current_token_kind() != TokenKind::Semicolon {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Return(ReturnStmt {
        value,
        span: parser.span_from(start),
    }))
}
