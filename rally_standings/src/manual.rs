/*!

This is the long-form manual for `rally_standings` and `rallytab`.

## Input sheets

An event is described by up to five sheets. Each of them is exported from
a spreadsheet, either as comma separated values (`csv`) or as an Excel
workbook (`xlsx`). In both cases the first row holds the column names.
Column names are case-insensitive: `Nombre` and `NOMBRE` are the same column.

The CSV exports are read without quoting: one record per line, fields
separated by commas. A field cannot contain a comma, and quotes are kept as
written. Blank lines are skipped and every field is trimmed.

### Stages (mandatory)

One row per special stage (PE):

| PE | Desde      | Hasta      | KMS  | HORA  |
|----|------------|------------|------|-------|
| 1  | YACANTO    | EL DURAZNO | 12,4 | 09:00 |
| 2  | EL DURAZNO | YACANTO    | 12,4 | 10:30 |

Rows without a `PE` are ignored. `KMS` accepts a decimal comma, and the
average speeds are only computed when it is a positive number. `HORA` is
only used when the start order does not give a start time for the stage.

### Results (mandatory)

One row per entrant, one `SS<n>` column per stage, and an optional
penalty:

| Nombre   | Categoria | SS1     | SS2  | Penalizacion |
|----------|-----------|---------|------|--------------|
| Ana Diaz | RC2       | 8:01.10 | DNF  | 0:10         |

Rows without a name or a category are ignored. A stage time can be:
- a time, such as `8:01.10`. The separators are read leniently: `8.01.10`,
  `8,01,10` and `8:01:10` are the same time. `1:02:03.50` is read with hours.
- `DNF` (also `D.N.F` and `D.N.F.`): the entrant did not finish the stage
  and receives the worst valid time of the stage plus one minute. In a
  stage classification the worst time is taken over the classified group.
  In a general classification it is taken over the entrant's category.
- empty: the entrant did not run the stage (yet). They are left out of the
  stage classification and out of every general classification that
  includes this stage.

An unreadable time is displayed as `-` and ranked last in the stage, and
it keeps the entrant out of the general classification. An unreadable
penalty counts as no penalty.

The number of stages must match the number of `SS<n>` columns. Otherwise
the standings are not computed and a diagnostic giving both numbers is
reported.

### Roster (optional)

The registered entrants, with the columns `Nº`, `Nombre`, `Vehiculo` and
`Categoria`. The brand of the vehicle is the first word of `Vehiculo`, in
lower case, except for the Skoda "RS" models which are reported as
`skodars`. The roster is listed by category, and each category gets one of
eight color slots.

### Start order (optional)

One row per entrant, with one `SS<n>` column per stage holding the start
time (`09:15`) or `-`. Any text around the time is ignored. The entrants are
listed by earliest start. A start time that changes between two refreshes
is highlighted for one minute.

### Event (optional)

The first row of the `Nombre` column names the event.

## Results

For every stage the report contains:
- the stage classification, overall and by category, with the gap to the
  fastest and the average speed,
- the general classification through that stage, overall and by category,
  with the penalty, the gaps to the leader and to the previous entrant, and
  the positions gained or lost since the previous stage.

The winners of each category are only published once at least one entrant
has a time for every stage.

## Configuration of `rallytab`

The sheets are described by a JSON file:

```json
{
  "outputSettings": {
    "eventName": "Rally de las Sierras"
  },
  "sheets": {
    "stages": { "provider": "csv", "filePath": "tramos.csv" },
    "results": { "provider": "xlsx", "filePath": "rally.xlsx", "worksheetName": "Pilotos" },
    "roster": { "provider": "csv", "filePath": "inscriptos.csv" }
  },
  "options": {
    "byCategory": true
  }
}
```

Relative paths are resolved against the directory of the configuration
file. The command line flags override the configuration file. See
`rallytab --help`.

*/
