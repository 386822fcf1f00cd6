//! PDF rendering of permission requests.
//!
//! Produces an A4 summary sheet of a solicitud so staff can print or
//! archive the request with its resolution.

use std::path::Path;

use genpdf::elements::{Break, Paragraph, StyledElement, TableLayout};
use genpdf::style::Style;
use genpdf::{Alignment, Document, Element, Margins, SimplePageDecorator};
use thiserror::Error;

use crate::storage::{Adjunto, Solicitud};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Error cargando fuentes desde {dir}: {source}")]
    Fonts {
        dir: String,
        source: genpdf::error::Error,
    },

    #[error("Error generando PDF: {0}")]
    Render(#[from] genpdf::error::Error),
}

fn p(text: &str, style: Style) -> StyledElement<Paragraph> {
    Paragraph::new(text).styled(style)
}

fn field_row(table: &mut TableLayout, label: &str, value: &str) -> Result<(), PdfError> {
    let s_label = Style::new().with_font_size(9).bold();
    let s_value = Style::new().with_font_size(9);

    table
        .row()
        .element(p(label, s_label).padded(Margins::trbl(1, 1, 1, 2)))
        .element(p(value, s_value).padded(Margins::trbl(1, 1, 1, 2)))
        .push()?;
    Ok(())
}

fn date_line(sol: &Solicitud) -> String {
    if sol.es_rango && !sol.fecha_fin.is_empty() {
        format!("Del {} al {}", sol.fecha_inicio, sol.fecha_fin)
    } else {
        sol.fecha_inicio.clone()
    }
}

fn time_line(sol: &Solicitud) -> Option<String> {
    match (sol.hora_inicio.as_deref(), sol.hora_fin.as_deref()) {
        (Some(inicio), Some(fin)) => Some(format!("De {inicio} a {fin}")),
        (Some(inicio), None) => Some(inicio.to_string()),
        _ => sol.hora_compact.clone(),
    }
}

fn adjunto_line(adjunto: &Adjunto) -> &str {
    adjunto
        .public_url
        .as_deref()
        .or(adjunto.path.as_deref())
        .unwrap_or("-")
}

/// Render an A4 summary of a solicitud with its attachment list. Fonts are
/// loaded from `fonts_dir`, which must hold the LiberationSans TTF set.
pub fn render_solicitud(
    sol: &Solicitud,
    adjuntos: &[Adjunto],
    fonts_dir: &Path,
) -> Result<Vec<u8>, PdfError> {
    let font_family =
        genpdf::fonts::from_files(fonts_dir, "LiberationSans", None).map_err(|source| {
            PdfError::Fonts {
                dir: fonts_dir.display().to_string(),
                source,
            }
        })?;

    let mut doc = Document::new(font_family);
    doc.set_title("Solicitud de Permiso");

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(Margins::trbl(15, 15, 15, 15));
    doc.set_page_decorator(decorator);

    let s_title = Style::new().with_font_size(14).bold();
    let s_subtitle = Style::new().with_font_size(10);
    let s_section = Style::new().with_font_size(11).bold();

    doc.push(
        Paragraph::new("CTP Mercedes Norte")
            .aligned(Alignment::Center)
            .styled(s_title),
    );
    doc.push(
        Paragraph::new("Solicitud de Permiso")
            .aligned(Alignment::Center)
            .styled(s_subtitle),
    );
    doc.push(Break::new(1.5));

    let mut table = TableLayout::new(vec![1, 2]);
    table.set_cell_decorator(genpdf::elements::FrameCellDecorator::new(true, true, false));

    field_row(
        &mut table,
        "Solicitante",
        sol.nombre_solicitante.as_deref().unwrap_or("-"),
    )?;
    field_row(&mut table, "Cédula", &sol.user_cedula)?;
    field_row(&mut table, "Posición", sol.posicion.as_deref().unwrap_or("-"))?;
    field_row(&mut table, "Instancia", sol.instancia.as_deref().unwrap_or("-"))?;
    field_row(
        &mut table,
        "Tipo de solicitud",
        &match sol.tipo_general.as_deref() {
            Some(general) if !general.is_empty() => {
                format!("{general} - {}", sol.tipo_solicitud)
            }
            _ => sol.tipo_solicitud.clone(),
        },
    )?;
    if let Some(familiar) = sol.familiar.as_deref() {
        field_row(&mut table, "Familiar", familiar)?;
    }
    field_row(&mut table, "Fecha", &date_line(sol))?;
    if let Some(jornada) = sol.jornada.as_deref() {
        field_row(&mut table, "Jornada", jornada)?;
    }
    if let Some(horas) = time_line(sol) {
        field_row(&mut table, "Horario", &horas)?;
    }
    if let (Some(cantidad), Some(unidad)) = (sol.cantidad.as_deref(), sol.unidad.as_deref()) {
        field_row(&mut table, "Cantidad", &format!("{cantidad} {unidad}"))?;
    }
    if let Some(hora_salida) = sol.hora_salida.as_deref() {
        field_row(&mut table, "Hora de salida", hora_salida)?;
    }
    if let Some(observaciones) = sol.observaciones.as_deref() {
        field_row(&mut table, "Observaciones", observaciones)?;
    }

    doc.push(table);
    doc.push(Break::new(1.5));

    if !adjuntos.is_empty() {
        doc.push(p("Adjuntos", s_section));
        doc.push(Break::new(0.5));

        let mut attachments = TableLayout::new(vec![1, 2]);
        attachments
            .set_cell_decorator(genpdf::elements::FrameCellDecorator::new(true, true, false));
        for (n, adjunto) in adjuntos.iter().enumerate() {
            field_row(
                &mut attachments,
                &format!("Adjunto {}", n + 1),
                adjunto_line(adjunto),
            )?;
        }
        doc.push(attachments);
        doc.push(Break::new(1.5));
    }

    doc.push(p("Resolución", s_section));
    doc.push(Break::new(0.5));

    let mut resolution = TableLayout::new(vec![1, 2]);
    resolution.set_cell_decorator(genpdf::elements::FrameCellDecorator::new(true, true, false));

    field_row(
        &mut resolution,
        "Estado",
        sol.estado.as_deref().unwrap_or("Pendiente"),
    )?;
    if let Some(nombre) = sol.respuesta_nombre.as_deref() {
        field_row(&mut resolution, "Resuelto por", nombre)?;
    }
    if let Some(en) = sol.respuesta_en.as_deref() {
        field_row(&mut resolution, "Fecha de resolución", en)?;
    }
    if let Some(comentario) = sol.respuesta_comentario.as_deref() {
        field_row(&mut resolution, "Comentario", comentario)?;
    }

    doc.push(resolution);

    let mut buffer = Vec::new();
    doc.render(&mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Solicitud {
        Solicitud {
            id: "sol1".into(),
            user_cedula: "101110111".into(),
            nombre_solicitante: Some("Ana Mora Jiménez".into()),
            posicion: Some("Docente".into()),
            instancia: Some("Diurna".into()),
            estado: Some("Aceptado".into()),
            tipo_general: Some("Personal".into()),
            tipo_solicitud: "Cita médica".into(),
            familiar: None,
            es_rango: true,
            fecha_inicio: "2024-06-10".into(),
            fecha_fin: "2024-06-11".into(),
            jornada: Some("Media jornada".into()),
            hora_inicio: Some("08:00".into()),
            hora_fin: Some("12:00".into()),
            hora_compact: None,
            cantidad: None,
            unidad: None,
            observaciones: Some("Control anual".into()),
            hora_salida: None,
            adjunto_url: None,
            adjunto_mime: None,
            respuesta_comentario: Some("Presentar comprobante".into()),
            respuesta_por: Some("900900900".into()),
            respuesta_nombre: Some("Rosa Solano Vargas".into()),
            respuesta_en: Some("2024-06-12T10:00:00Z".into()),
            created_at: 0,
        }
    }

    #[test]
    fn date_line_covers_ranges_and_single_days() {
        let mut sol = sample();
        assert_eq!(date_line(&sol), "Del 2024-06-10 al 2024-06-11");

        sol.es_rango = false;
        assert_eq!(date_line(&sol), "2024-06-10");
    }

    #[test]
    fn adjunto_line_prefers_the_public_url() {
        let mut adjunto = Adjunto {
            path: Some("101/1718100000000_receta.pdf".into()),
            public_url: Some("/files/101/1718100000000_receta.pdf".into()),
            mime: Some("application/pdf".into()),
            uploaded_by_cedula: Some("101110111".into()),
            uploaded_at: 0,
        };
        assert_eq!(adjunto_line(&adjunto), "/files/101/1718100000000_receta.pdf");

        adjunto.public_url = None;
        assert_eq!(adjunto_line(&adjunto), "101/1718100000000_receta.pdf");

        adjunto.path = None;
        assert_eq!(adjunto_line(&adjunto), "-");
    }

    #[test]
    fn time_line_prefers_explicit_range() {
        let mut sol = sample();
        assert_eq!(time_line(&sol).as_deref(), Some("De 08:00 a 12:00"));

        sol.hora_fin = None;
        assert_eq!(time_line(&sol).as_deref(), Some("08:00"));

        sol.hora_inicio = None;
        sol.hora_compact = Some("08:00-12:00".into());
        assert_eq!(time_line(&sol).as_deref(), Some("08:00-12:00"));
    }
}
